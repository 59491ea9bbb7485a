// Dashboard configuration

use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/amit-12k/analytics-dashboard-assessment/refs/heads/main/data-to-visualize/Electric_Vehicle_Population_Data.csv";

/// One dashboard panel, described by a chart spec string
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChartConfig {
    pub name: String,
    pub spec: String,
}

impl ChartConfig {
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// URL, file path, or `-` for stdin
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(flatten)]
    pub render: RenderOptions,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
}

fn default_title() -> String {
    "Electric Vehicle Dashboard".to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_fetch_timeout() -> u64 {
    60
}

fn default_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig::new(
            "manufacturers",
            r#"bar(column: Make, color: "rgba(59, 130, 246, 0.8)") | labs(title: "Vehicle Count by Manufacturer", y: "Number of Vehicles")"#,
        ),
        ChartConfig::new(
            "fuel_types",
            r#"pie(column: "Electric Vehicle Type") | labs(title: "Fuel Type Distribution")"#,
        ),
        ChartConfig::new(
            "model_years",
            r#"line(column: "Model Year", order: "sorted", color: "rgba(251, 146, 60, 1)", fill: true) | labs(title: "Growth of EV Registrations Over Years", y: "Registrations")"#,
        ),
        ChartConfig::new(
            "counties",
            r#"bar(column: County) | labs(title: "EV Count by County", y: "EV Counts")"#,
        ),
    ]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            source: default_source(),
            fetch_timeout_secs: default_fetch_timeout(),
            render: RenderOptions::default(),
            charts: default_charts(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid dashboard configuration")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Replace the chart list with ad-hoc specs named `chart1`, `chart2`, ...
    pub fn with_chart_specs(mut self, specs: &[String]) -> Self {
        if !specs.is_empty() {
            self.charts = specs
                .iter()
                .enumerate()
                .map(|(i, spec)| ChartConfig::new(format!("chart{}", i + 1), spec.clone()))
                .collect();
        }
        self
    }
}
