// Dashboard layout: which series go on which panel
use super::catalog::Catalog;
use super::series::SeriesId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlotConfig {
    pub id: SeriesId,
    pub color: Option<String>,
    pub fill_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub plot: Vec<PlotConfig>,
    pub side_bar: Vec<SeriesId>,
    pub bottom_bar: HashMap<String, Vec<SeriesId>>,
}

impl Layout {
    /// Parameters shown in the bottom bar for `mode`; unknown modes show none
    pub fn bottom_bar_for(&self, mode: &str) -> &[SeriesId] {
        self.bottom_bar.get(mode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every series a tick has to fetch so that all panels of `mode` can render,
    /// including alarm and min/max companions.
    pub fn required_series(&self, catalog: &Catalog, mode: &str) -> BTreeSet<SeriesId> {
        let mut required = BTreeSet::new();

        for id in self.plot.iter().map(|p| &p.id).chain(&self.side_bar) {
            required.insert(id.clone());
            if let Ok(meta) = catalog.measurement(id) {
                required.extend(meta.related_keys().cloned());
            }
        }

        for id in self.bottom_bar_for(mode) {
            required.insert(id.clone());
            if let Ok(meta) = catalog.parameter(id) {
                required.extend(meta.min_key.iter().cloned());
                required.extend(meta.max_key.iter().cloned());
            }
        }

        required
    }

    /// Referenced series that have no metadata entry
    pub fn missing_metadata(&self, catalog: &Catalog, mode: &str) -> Vec<SeriesId> {
        let measurements = self
            .plot
            .iter()
            .map(|p| &p.id)
            .chain(&self.side_bar)
            .filter(|id| catalog.measurement(id).is_err());
        let parameters = self
            .bottom_bar_for(mode)
            .iter()
            .filter(|id| catalog.parameter(id).is_err());

        let mut missing: Vec<SeriesId> = measurements.chain(parameters).cloned().collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
