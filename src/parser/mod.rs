// Chart spec parser module

pub mod ast;
pub mod geom;
pub mod labels;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::{ChartSpec, ChartStyle, Geom, Labels};
pub use pipeline::parse_chart_spec;
