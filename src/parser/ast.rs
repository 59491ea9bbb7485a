// Abstract Syntax Tree for the chart spec language

use crate::aggregate::OrderingPolicy;
use serde::Serialize;

/// Complete description of one dashboard panel
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub geom: Geom,
    /// Column whose distinct values become the chart categories
    pub column: String,
    pub order: OrderingPolicy,
    /// Keep only the first `top` groups; `None` keeps everything
    pub top: Option<i64>,
    pub style: ChartStyle,
    pub labels: Labels,
}

/// Chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Geom {
    Bar,
    Line,
    Pie,
}

/// Fixed visual properties (not data-driven)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartStyle {
    pub color: Option<String>,
    pub alpha: Option<f64>,
    /// Shade the area under a line chart
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl ChartSpec {
    /// Panel title: the explicit one, or the column name
    pub fn title(&self) -> &str {
        self.labels.title.as_deref().unwrap_or(&self.column)
    }
}
