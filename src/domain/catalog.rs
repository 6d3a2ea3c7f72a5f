// Static series metadata
use super::series::SeriesId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingKeyError {
    #[error("no measurement metadata for series {0}")]
    Measurement(SeriesId),
    #[error("no parameter metadata for series {0}")]
    Parameter(SeriesId),
}

/// Metadata of a diagnostic measurement (`DM####`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeasurementMeta {
    pub display_name: String,
    pub unit: String,
    pub range: [f64; 2],
    #[serde(default)]
    pub min_key: Option<SeriesId>,
    #[serde(default)]
    pub max_key: Option<SeriesId>,
    #[serde(default)]
    pub low_alarm_key: Option<SeriesId>,
    #[serde(default)]
    pub high_alarm_key: Option<SeriesId>,
    #[serde(default)]
    pub alarm_set_key: Option<SeriesId>,
    #[serde(default)]
    pub alarm_triggered_key: Option<SeriesId>,
}

impl MeasurementMeta {
    pub fn title(&self) -> String {
        format!("{} [{}]", self.display_name, self.unit)
    }

    /// Every related series this measurement needs fetched alongside it
    pub fn related_keys(&self) -> impl Iterator<Item = &SeriesId> {
        [
            &self.min_key,
            &self.max_key,
            &self.low_alarm_key,
            &self.high_alarm_key,
            &self.alarm_set_key,
            &self.alarm_triggered_key,
        ]
        .into_iter()
        .flatten()
    }
}

/// Metadata of a user-set parameter (`Pv####`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterMeta {
    pub display_name: String,
    pub unit: String,
    pub total_range: [f64; 2],
    #[serde(default)]
    pub min_key: Option<SeriesId>,
    #[serde(default)]
    pub max_key: Option<SeriesId>,
}

impl ParameterMeta {
    pub fn title(&self) -> String {
        format!("{} [{}]", self.display_name, self.unit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    measurements: HashMap<SeriesId, MeasurementMeta>,
    parameters: HashMap<SeriesId, ParameterMeta>,
}

impl Catalog {
    pub fn new(
        measurements: HashMap<SeriesId, MeasurementMeta>,
        parameters: HashMap<SeriesId, ParameterMeta>,
    ) -> Self {
        Self {
            measurements,
            parameters,
        }
    }

    pub fn measurement(&self, id: &str) -> Result<&MeasurementMeta, MissingKeyError> {
        self.measurements
            .get(id)
            .ok_or_else(|| MissingKeyError::Measurement(id.to_string()))
    }

    pub fn parameter(&self, id: &str) -> Result<&ParameterMeta, MissingKeyError> {
        self.parameters
            .get(id)
            .ok_or_else(|| MissingKeyError::Parameter(id.to_string()))
    }
}
