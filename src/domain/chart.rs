// Chart-ready domain models handed to the renderer
use super::measurement::Parameter;
use super::selection::{Selection, ViewMode};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    /// Parameter values for this server; not index-aligned with the chart labels.
    pub values: Vec<f64>,
    /// The same values keyed by their time label.
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub parameter: Parameter,
    pub title: String,
    pub unit: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub colors: Vec<String>,
}

/// Load state of the active data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum DataStatus {
    Loading,
    Ready,
    NoData,
    Failed(String),
}

/// Everything the front-end needs to draw one frame of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub revision: u64,
    pub mode: ViewMode,
    pub status: DataStatus,
    pub selection: Selection,
    pub servers: Vec<String>,
    pub line: LineChart,
    pub bars: Vec<BarChart>,
}
