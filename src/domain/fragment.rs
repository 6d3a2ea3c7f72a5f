// UI fragment domain models, consumed by the front end on every tick
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Text styling of a value or threshold label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Normal,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Option<String>,
    pub range: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub series: String,
    pub color: Option<String>,
    pub fill_color: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub y_axis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub x_axis: Axis,
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub tone: Tone,
}

impl Label {
    pub fn new(text: String, tone: Tone) -> Self {
        Self { text, tone }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBox {
    pub series: String,
    pub title: String,
    pub value: Label,
    /// Value comes from the last-value cache, not the current window
    pub stale: bool,
    /// `None` is the explicit empty placeholder
    pub low_limit: Option<Label>,
    pub high_limit: Option<Label>,
    pub mean: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub series: String,
    pub title: String,
    pub value: Option<f64>,
    pub scale: Option<[f64; 2]>,
    pub band: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineStatus {
    pub text: String,
    /// False while no machine-status series is wired in
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub chart: ChartPanel,
    pub side_bar: Vec<StatusBox>,
    pub bottom_bar: Vec<Gauge>,
    pub machine_status: MachineStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum SourceStatus {
    Connected,
    Unreachable(String),
}

/// One published tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub generated_at: DateTime<Utc>,
    pub source: SourceStatus,
    pub dashboard: Dashboard,
}
