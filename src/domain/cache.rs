// Last-value cache domain model
use super::series::{Sample, SeriesId, Snapshot};
use std::collections::HashMap;

/// Most recent non-empty observation per series, kept across ticks.
///
/// Entries are only ever overwritten, never removed: a series that drops out
/// of the current snapshot keeps its last known value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastValueCache {
    entries: HashMap<SeriesId, Sample>,
}

impl LastValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a freshly assembled snapshot
    pub fn update(&mut self, snapshot: &Snapshot) {
        for (id, series) in snapshot.iter() {
            if let Some(last) = series.last() {
                self.entries.insert(id.clone(), last);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Sample> {
        self.entries.get(id).copied()
    }

    pub fn value(&self, id: &str) -> Option<f64> {
        self.get(id).map(|s| s.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
