use crate::domain::catalog::{Catalog, MeasurementMeta, ParameterMeta};
use crate::domain::layout::{Layout, PlotConfig};
use crate::domain::series::SeriesId;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    pub influx: InfluxSettings,
    pub monitor: MonitorSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub token: Option<String>,
    pub retention_policy: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    pub update_interval_secs: f64,
    pub lookback_secs: f64,
    pub window_secs: f64,
    pub bucket_ms: u64,
    pub fetch_timeout_ms: u64,
    pub mode: String,
    pub panels_path: String,
}

impl MonitorSettings {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(self.update_interval_secs)
    }

    pub fn lookback(&self) -> Duration {
        Duration::from_secs_f64(self.lookback_secs)
    }

    pub fn bucket(&self) -> Duration {
        Duration::from_millis(self.bucket_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

/// Static panel tables as written in `panels.toml`
#[derive(Debug, Deserialize, Clone)]
pub struct PanelsConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub side_bar: Vec<SeriesId>,
    #[serde(default)]
    pub plot: Vec<PlotConfig>,
    #[serde(default)]
    pub bottom_bar: HashMap<String, Vec<SeriesId>>,
    #[serde(default)]
    pub measurements: HashMap<SeriesId, MeasurementMeta>,
    #[serde(default)]
    pub parameters: HashMap<SeriesId, ParameterMeta>,
}

impl PanelsConfig {
    pub fn into_parts(self) -> (Layout, Catalog) {
        let layout = Layout {
            title: self.title,
            plot: self.plot,
            side_bar: self.side_bar,
            bottom_bar: self.bottom_bar,
        };
        (layout, Catalog::new(self.measurements, self.parameters))
    }
}

fn default_title() -> String {
    "HDvent".to_string()
}

/// Load process settings from `config/monitor` (optional) with defaults and
/// the deployment environment variables layered on top
pub fn load_monitor_config() -> Result<MonitorConfig> {
    load_monitor_config_from("config/monitor", |key| std::env::var(key).ok())
}

pub fn load_monitor_config_from(
    file: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<MonitorConfig> {
    let settings = config::Config::builder()
        .set_default("influx.host", "localhost")?
        .set_default("influx.port", 8086)?
        .set_default("influx.database", "default")?
        .set_default("monitor.update_interval_secs", 1.0)?
        .set_default("monitor.lookback_secs", 32.0)?
        .set_default("monitor.window_secs", 30.0)?
        .set_default("monitor.bucket_ms", 100)?
        .set_default("monitor.fetch_timeout_ms", 800)?
        .set_default("monitor.mode", "debug")?
        .set_default("monitor.panels_path", "config/panels.toml")?
        .set_default("server.bind", "0.0.0.0:8050")?
        .add_source(config::File::with_name(file).required(false))
        .set_override_option("influx.host", env("INFLUXDB_HOST"))?
        .set_override_option("influx.port", env("INFLUXDB_PORT"))?
        .set_override_option("influx.database", env("INFLUXDB_DATABASE"))?
        .set_override_option(
            "monitor.update_interval_secs",
            env("GRAPH_UPDATE_INTERVAL_SECONDS"),
        )?
        .set_override_option("server.bind", env("MONITOR_BIND"))?
        .build()?;

    let config: MonitorConfig = settings
        .try_deserialize()
        .context("invalid monitor configuration")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &MonitorConfig) -> Result<()> {
    let monitor = &config.monitor;
    if !(monitor.update_interval_secs.is_finite() && monitor.update_interval_secs > 0.0) {
        anyhow::bail!("monitor.update_interval_secs must be positive");
    }
    if !(monitor.lookback_secs.is_finite() && monitor.lookback_secs > 0.0) {
        anyhow::bail!("monitor.lookback_secs must be positive");
    }
    if !(monitor.window_secs.is_finite() && monitor.window_secs > 0.0) {
        anyhow::bail!("monitor.window_secs must be positive");
    }
    if monitor.bucket_ms == 0 {
        anyhow::bail!("monitor.bucket_ms must be positive");
    }
    if monitor.fetch_timeout_ms == 0 {
        anyhow::bail!("monitor.fetch_timeout_ms must be positive");
    }
    Ok(())
}

/// Panel tables are keyed by case-sensitive series ids, so they are parsed
/// with `toml` directly rather than through the case-folding config layer
pub fn load_panels_config(path: impl AsRef<Path>) -> Result<PanelsConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read panel config {}", path.display()))?;
    parse_panels_config(&text).with_context(|| format!("invalid panel config {}", path.display()))
}

pub fn parse_panels_config(text: &str) -> Result<PanelsConfig> {
    Ok(toml::from_str(text)?)
}
