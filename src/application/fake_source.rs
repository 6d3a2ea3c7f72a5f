// In-memory series source for tests
use crate::application::series_source::{SeriesSource, SourceError};
use crate::domain::series::{Sample, SeriesId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<HashMap<SeriesId, Result<Vec<Sample>, SourceError>>>,
    delays: HashMap<SeriesId, Duration>,
    unreachable: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_series(self, id: &str, samples: &[(f64, f64)]) -> Self {
        let samples = samples.iter().map(|&(t, v)| Sample::new(t, v)).collect();
        self.set(id, Ok(samples));
        self
    }

    pub fn with_error(self, id: &str, error: SourceError) -> Self {
        self.set(id, Err(error));
        self
    }

    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Replace the response for `id` between ticks
    pub fn set(&self, id: &str, response: Result<Vec<Sample>, SourceError>) {
        self.responses
            .lock()
            .expect("fake source poisoned")
            .insert(id.to_string(), response);
    }
}

#[async_trait]
impl SeriesSource for FakeSource {
    async fn list_series(&self) -> Result<Vec<SeriesId>, SourceError> {
        if self.unreachable {
            return Err(SourceError::Connection("connection refused".to_string()));
        }
        let mut ids: Vec<SeriesId> = self
            .responses
            .lock()
            .expect("fake source poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn fetch_recent(
        &self,
        series: &str,
        _lookback: Duration,
        _bucket: Duration,
    ) -> Result<Vec<Sample>, SourceError> {
        if let Some(delay) = self.delays.get(series) {
            tokio::time::sleep(*delay).await;
        }
        if self.unreachable {
            return Err(SourceError::Connection("connection refused".to_string()));
        }

        self.responses
            .lock()
            .expect("fake source poisoned")
            .get(series)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
