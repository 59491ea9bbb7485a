// Dashboard orchestration: load once, aggregate per panel, render

use crate::aggregate::{self, AggregationResult};
use crate::config::DashboardConfig;
use crate::data::Dataset;
use crate::graph;
use crate::parser::ast::{ChartSpec, Geom};
use crate::source::{self, LoadOptions, Source};
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Serialize;

/// What a panel shows
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Data(AggregationResult),
    /// The source could not be loaded; holds the reason
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub name: String,
    pub spec: ChartSpec,
    pub content: PanelContent,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub panels: Vec<Panel>,
}

/// Serializable view of one panel's data
#[derive(Debug, Clone, Serialize)]
pub struct PanelSummary<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub chart: Geom,
    #[serde(flatten)]
    pub result: &'a AggregationResult,
}

impl Dashboard {
    /// Aggregate every configured chart over an already loaded dataset
    pub fn build(config: &DashboardConfig, dataset: &Dataset) -> Result<Self> {
        let mut panels = Vec::with_capacity(config.charts.len());
        for chart in &config.charts {
            let spec = ChartSpec::parse(&chart.spec)
                .with_context(|| format!("Invalid chart '{}'", chart.name))?;
            let result = aggregate_panel(&spec, dataset);
            log::debug!(
                "panel '{}': {} groups over column '{}'",
                chart.name,
                result.len(),
                spec.column
            );
            panels.push(Panel {
                name: chart.name.clone(),
                spec,
                content: PanelContent::Data(result),
            });
        }

        Ok(Dashboard {
            title: config.title.clone(),
            panels,
        })
    }

    /// Placeholder dashboard: every panel keeps its title and carries `reason` instead of data
    pub fn unavailable(config: &DashboardConfig, reason: &str) -> Result<Self> {
        let mut panels = Vec::with_capacity(config.charts.len());
        for chart in &config.charts {
            let spec = ChartSpec::parse(&chart.spec)
                .with_context(|| format!("Invalid chart '{}'", chart.name))?;
            panels.push(Panel {
                name: chart.name.clone(),
                spec,
                content: PanelContent::Unavailable(reason.to_string()),
            });
        }

        Ok(Dashboard {
            title: config.title.clone(),
            panels,
        })
    }

    /// Single load attempt. Upstream failures give the placeholder dashboard
    /// rather than an error; only invalid chart specs fail.
    pub fn load(config: &DashboardConfig, source: &Source) -> Result<Self> {
        let options = LoadOptions {
            timeout: config.fetch_timeout(),
        };
        match source::load(source, &options) {
            Ok(dataset) => Self::build(config, &dataset),
            Err(e) => {
                log::warn!("{}; rendering placeholder dashboard", e);
                Self::unavailable(config, &e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.panels
            .iter()
            .all(|p| matches!(p.content, PanelContent::Data(_)))
    }

    pub fn summaries(&self) -> Vec<PanelSummary<'_>> {
        self.panels
            .iter()
            .filter_map(|p| match &p.content {
                PanelContent::Data(result) => Some(PanelSummary {
                    name: &p.name,
                    title: p.spec.title(),
                    chart: p.spec.geom,
                    result,
                }),
                PanelContent::Unavailable(_) => None,
            })
            .collect()
    }

    pub fn render(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        graph::render_dashboard(self, options).context("Failed to render dashboard")
    }
}

/// Group and optionally truncate. A negative `top` is logged and ignored.
pub fn aggregate_panel(spec: &ChartSpec, dataset: &Dataset) -> AggregationResult {
    let result = aggregate::group_by(dataset, &spec.column, spec.order);
    match spec.top {
        None => result,
        Some(n) => match result.top_n(n) {
            Ok(truncated) => truncated,
            Err(e) => {
                log::warn!("{} for column '{}'; showing all groups", e, spec.column);
                result
            }
        },
    }
}

/// Rows and columns for `n_panels` in a near-square grid
pub fn grid_dimensions(n_panels: usize) -> (usize, usize) {
    if n_panels == 0 {
        return (1, 1);
    }
    let cols = (n_panels as f64).sqrt().ceil() as usize;
    let rows = (n_panels as f64 / cols as f64).ceil() as usize;
    (rows, cols)
}
