// Pipeline parser for the chart spec language

use super::ast::{ChartSpec, Labels};
use super::geom::{parse_geom, GeomCall};
use super::labels::parse_labs;
use super::lexer::ws;
use anyhow::{anyhow, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map},
    error::{Error, ErrorKind},
    multi::separated_list1,
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Geom(GeomCall),
    Labels(Labels),
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_geom, PipelineComponent::Geom),
        map(parse_labs, PipelineComponent::Labels),
    ))(input)
}

/// Parse a complete chart specification
/// Format: component | component | ...
pub fn parse_chart_spec(input: &str) -> IResult<&str, ChartSpec> {
    let (rest, components) = separated_list1(ws(tag("|")), parse_pipeline_component)(input)?;

    let (rest, _) = ws(eof)(rest)?;

    let mut geom_call: Option<GeomCall> = None;
    let mut labels = Labels::default();

    for comp in components {
        match comp {
            PipelineComponent::Geom(g) => {
                // Exactly one geom per chart
                if geom_call.is_some() {
                    return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
                }
                geom_call = Some(g);
            }
            PipelineComponent::Labels(l) => {
                // Later labs() calls override fields set by earlier ones
                labels.title = l.title.or(labels.title);
                labels.x = l.x.or(labels.x);
                labels.y = l.y.or(labels.y);
            }
        }
    }

    let call = geom_call.ok_or_else(|| nom::Err::Error(Error::new(input, ErrorKind::Verify)))?;
    let (geom, column) = match (call.geom, call.column) {
        (Some(geom), Some(column)) => (geom, column),
        _ => return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
    };

    Ok((
        rest,
        ChartSpec {
            geom,
            column,
            order: call.order.unwrap_or_default(),
            top: call.top,
            style: call.style,
            labels,
        },
    ))
}

impl ChartSpec {
    /// Parse a chart spec string, reporting where parsing stopped on failure
    pub fn parse(input: &str) -> Result<Self> {
        match parse_chart_spec(input) {
            Ok((_, spec)) => Ok(spec),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(anyhow!(
                "Parse error in chart spec '{}': {:?} at '{}'",
                input,
                e.code,
                e.input
            )),
            Err(nom::Err::Incomplete(_)) => {
                Err(anyhow!("Parse error in chart spec '{}': incomplete input", input))
            }
        }
    }
}
