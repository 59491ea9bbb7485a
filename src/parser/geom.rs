// Geometry (geom) parser for the chart spec language

use super::ast::{ChartStyle, Geom};
use super::lexer::{bool_literal, identifier, number_literal, string_literal, ws};
use crate::aggregate::OrderingPolicy;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i64 as integer},
    combinator::{map, map_res, value},
    multi::separated_list0,
    sequence::{pair, preceded},
    IResult,
};

/// A geom call before validation: `column` is still optional here
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomCall {
    pub geom: Option<Geom>,
    pub column: Option<String>,
    pub order: Option<OrderingPolicy>,
    pub top: Option<i64>,
    pub style: ChartStyle,
}

enum GeomArg {
    Column(String),
    Order(OrderingPolicy),
    Top(i64),
    Color(String),
    Alpha(f64),
    Fill(bool),
}

/// `name :` with whitespace allowed on either side of the colon
fn arg_key<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    value((), pair(ws(tag(name)), ws(char(':'))))
}

fn parse_geom_arg(input: &str) -> IResult<&str, GeomArg> {
    alt((
        map(
            preceded(arg_key("column"), ws(alt((string_literal, identifier)))),
            GeomArg::Column,
        ),
        map(
            preceded(
                arg_key("order"),
                ws(map_res(alt((string_literal, identifier)), |s| {
                    s.parse::<OrderingPolicy>()
                })),
            ),
            GeomArg::Order,
        ),
        map(preceded(arg_key("top"), ws(integer)), GeomArg::Top),
        map(preceded(arg_key("color"), ws(string_literal)), GeomArg::Color),
        map(preceded(arg_key("alpha"), ws(number_literal)), GeomArg::Alpha),
        map(preceded(arg_key("fill"), ws(bool_literal)), GeomArg::Fill),
    ))(input)
}

/// Parse a geometry
/// Format: bar(column: Make) or line(column: "Model Year", order: "sorted", fill: true)
pub fn parse_geom(input: &str) -> IResult<&str, GeomCall> {
    let (input, geom) = ws(alt((
        value(Geom::Bar, tag("bar")),
        value(Geom::Line, tag("line")),
        value(Geom::Pie, tag("pie")),
    )))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(ws(char(',')), parse_geom_arg)(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut call = GeomCall {
        geom: Some(geom),
        ..GeomCall::default()
    };

    for arg in args {
        match arg {
            GeomArg::Column(c) => call.column = Some(c),
            GeomArg::Order(o) => call.order = Some(o),
            GeomArg::Top(n) => call.top = Some(n),
            GeomArg::Color(c) => call.style.color = Some(c),
            GeomArg::Alpha(a) => call.style.alpha = Some(a),
            GeomArg::Fill(f) => call.style.fill = f,
        }
    }

    Ok((input, call))
}
