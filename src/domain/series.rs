// Series domain models
use std::collections::BTreeMap;

/// Identifier of one measured or user-set quantity, e.g. `DMpins` or `PvVolu`
pub type SeriesId = String;

/// One bucket-averaged reading. `time` is seconds relative to the fetch
/// instant and is never positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Samples of one series over the lookback window, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    samples: Vec<Sample>,
}

impl SeriesSnapshot {
    /// Builds a snapshot, restoring time order if the rows came back unsorted.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> Option<Sample> {
        self.samples.last().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        Some(sum / self.samples.len() as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.value).reduce(f64::max)
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// All configured series as fetched during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    series: BTreeMap<SeriesId, SeriesSnapshot>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SeriesId, series: SeriesSnapshot) {
        self.series.insert(id, series);
    }

    pub fn get(&self, id: &str) -> Option<&SeriesSnapshot> {
        self.series.get(id)
    }

    /// Most recent sample of `id`, if the series is present and non-empty
    pub fn last(&self, id: &str) -> Option<Sample> {
        self.get(id).and_then(SeriesSnapshot::last)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesId, &SeriesSnapshot)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }
}

impl FromIterator<(SeriesId, SeriesSnapshot)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (SeriesId, SeriesSnapshot)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}
