// Snapshot assembler - fetches every configured series once per tick
use crate::application::series_source::{SeriesSource, SourceError};
use crate::domain::cache::LastValueCache;
use crate::domain::series::{Sample, SeriesId, SeriesSnapshot, Snapshot};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchWindow {
    pub lookback: Duration,
    pub bucket: Duration,
    pub timeout: Duration,
}

/// Result of one tick: the immutable snapshot plus the cache state right
/// after it was absorbed
#[derive(Debug, Clone)]
pub struct Assembled {
    pub snapshot: Arc<Snapshot>,
    pub cache: LastValueCache,
    pub failures: Vec<(SeriesId, SourceError)>,
}

pub struct SnapshotAssembler {
    source: Arc<dyn SeriesSource>,
    series: Vec<SeriesId>,
    window: FetchWindow,
    cache: Mutex<LastValueCache>,
}

impl SnapshotAssembler {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        series: impl IntoIterator<Item = SeriesId>,
        window: FetchWindow,
    ) -> Self {
        Self {
            source,
            series: series.into_iter().collect(),
            window,
            cache: Mutex::new(LastValueCache::new()),
        }
    }

    pub fn series(&self) -> &[SeriesId] {
        &self.series
    }

    pub async fn assemble(&self) -> Assembled {
        let fetches = self.series.iter().map(|id| async move {
            let result = self.fetch_one(id).await;
            (id, result)
        });

        let mut snapshot = Snapshot::new();
        let mut failures = Vec::new();

        for (id, result) in join_all(fetches).await {
            let series = match result {
                Ok(samples) => SeriesSnapshot::new(samples),
                Err(e) => {
                    tracing::warn!("Error fetching series {}: {}", id, e);
                    failures.push((id.clone(), e));
                    SeriesSnapshot::empty()
                }
            };
            snapshot.insert(id.clone(), series);
        }

        let cache = {
            let mut cache = self.cache.lock().await;
            cache.update(&snapshot);
            cache.clone()
        };

        let samples: usize = snapshot.iter().map(|(_, s)| s.len()).sum();
        tracing::debug!(
            "Assembled {} samples across {} series ({} failed), {} cached values",
            samples,
            snapshot.len(),
            failures.len(),
            cache.len()
        );

        Assembled {
            snapshot: Arc::new(snapshot),
            cache,
            failures,
        }
    }

    async fn fetch_one(&self, id: &str) -> Result<Vec<Sample>, SourceError> {
        let fetch = self
            .source
            .fetch_recent(id, self.window.lookback, self.window.bucket);
        match tokio::time::timeout(self.window.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_source::FakeSource;

    fn window() -> FetchWindow {
        FetchWindow {
            lookback: Duration::from_secs(32),
            bucket: Duration::from_millis(100),
            timeout: Duration::from_millis(200),
        }
    }

    fn ids(ids: &[&str]) -> Vec<SeriesId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failing_series_gets_empty_entry() {
        let source = FakeSource::new()
            .with_series("DMpins", &[(-1.0, 20.0), (-0.5, 22.0)])
            .with_series("DMflow", &[(-2.0, 10.0), (-1.0, 12.0), (0.0, 14.0)])
            .with_error("DMcvol", SourceError::Query("bad identifier".to_string()));
        let assembler =
            SnapshotAssembler::new(Arc::new(source), ids(&["DMpins", "DMflow", "DMcvol"]), window());

        let assembled = assembler.assemble().await;

        assert_eq!(assembled.failures.len(), 1);
        assert_eq!(assembled.snapshot.len(), 3);
        assert!(assembled.snapshot.get("DMcvol").is_some_and(SeriesSnapshot::is_empty));
        assert_eq!(assembled.snapshot.get("DMflow").map(SeriesSnapshot::len), Some(3));
        assert_eq!(assembled.snapshot.get("DMpins").map(SeriesSnapshot::len), Some(2));
    }

    #[tokio::test]
    async fn test_configured_series_without_data_are_present_and_empty() {
        let assembler = SnapshotAssembler::new(Arc::new(FakeSource::new()), ids(&["SApeep"]), window());
        let assembled = assembler.assemble().await;
        assert!(assembled.failures.is_empty());
        assert!(assembled.snapshot.get("SApeep").is_some_and(SeriesSnapshot::is_empty));
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let source = FakeSource::new()
            .with_series("DMflow", &[(-0.1, 1.0)])
            .with_series("DMpeep", &[(-0.1, 5.0)])
            .with_delay("DMflow", Duration::from_secs(5));
        let assembler = SnapshotAssembler::new(Arc::new(source), ids(&["DMflow", "DMpeep"]), window());

        let assembled = assembler.assemble().await;

        assert_eq!(assembled.failures, vec![("DMflow".to_string(), SourceError::Timeout)]);
        assert!(assembled.snapshot.get("DMflow").is_some_and(SeriesSnapshot::is_empty));
        assert_eq!(assembled.snapshot.last("DMpeep"), Some(Sample::new(-0.1, 5.0)));
    }

    #[tokio::test]
    async fn test_cache_is_monotonic_across_ticks() {
        let source = Arc::new(
            FakeSource::new()
                .with_series("HApeep", &[(-0.3, 40.0)])
                .with_series("DMpeep", &[(-0.3, 5.0)]),
        );
        let assembler = SnapshotAssembler::new(source.clone(), ids(&["HApeep", "DMpeep"]), window());

        let first = assembler.assemble().await;
        assert_eq!(first.cache.value("HApeep"), Some(40.0));

        source.set("HApeep", Ok(Vec::new()));
        source.set("DMpeep", Err(SourceError::Connection("down".to_string())));
        let second = assembler.assemble().await;
        assert_eq!(second.cache.value("HApeep"), Some(40.0));
        assert_eq!(second.cache.value("DMpeep"), Some(5.0));

        source.set("HApeep", Ok(vec![Sample::new(-0.1, 45.0)]));
        let third = assembler.assemble().await;
        assert_eq!(third.cache.value("HApeep"), Some(45.0));
    }

    #[tokio::test]
    async fn test_snapshot_samples_are_ordered_and_not_positive() {
        let source = FakeSource::new().with_series("DMflow", &[(-0.1, 3.0), (-0.3, 1.0), (-0.2, 2.0)]);
        let assembler = SnapshotAssembler::new(Arc::new(source), ids(&["DMflow"]), window());

        let assembled = assembler.assemble().await;
        for (_, series) in assembled.snapshot.iter() {
            let times = series.times();
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
            assert!(times.iter().all(|t| *t <= 0.0));
        }
    }
}
