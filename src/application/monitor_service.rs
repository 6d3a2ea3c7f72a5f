// Monitor service - Timer-driven fetch, assemble and render pipeline
use crate::application::assembler::{FetchWindow, SnapshotAssembler};
use crate::application::panels::Panels;
use crate::application::series_source::{SeriesSource, SourceError};
use crate::domain::cache::LastValueCache;
use crate::domain::fragment::{Frame, SourceStatus};
use crate::domain::series::{SeriesId, Snapshot};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Owns everything a tick needs: the data source, the assembler (and with it
/// the last-value cache) and the static panel configuration. Frames are
/// published on a watch channel so readers always see the latest tick.
pub struct MonitorService {
    source: Arc<dyn SeriesSource>,
    assembler: SnapshotAssembler,
    panels: Panels,
    interval: Duration,
    status: Mutex<SourceStatus>,
    frames: watch::Sender<Arc<Frame>>,
}

impl MonitorService {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        panels: Panels,
        window: FetchWindow,
        interval: Duration,
    ) -> Self {
        let required = panels.layout.required_series(&panels.catalog, &panels.mode);
        let assembler = SnapshotAssembler::new(source.clone(), required, window);

        // Tick 0 is the static layout with no data, so clients can draw before
        // the first fetch completes
        let initial = Frame {
            tick: 0,
            generated_at: Utc::now(),
            source: SourceStatus::Connected,
            dashboard: panels.render(&Snapshot::new(), &LastValueCache::new()),
        };
        let (frames, _) = watch::channel(Arc::new(initial));

        Self {
            source,
            assembler,
            panels,
            interval: interval.max(MIN_INTERVAL),
            status: Mutex::new(SourceStatus::Connected),
            frames,
        }
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Frame>> {
        self.frames.subscribe()
    }

    pub fn latest(&self) -> Arc<Frame> {
        self.frames.borrow().clone()
    }

    pub async fn list_series(&self) -> Result<Vec<SeriesId>, SourceError> {
        self.source.list_series().await
    }

    /// Startup check against the database. An unreachable database is
    /// reported to the operator and to clients, but does not stop the service.
    pub async fn probe(&self) -> SourceStatus {
        let status = match self.source.list_series().await {
            Ok(available) => {
                let available: HashSet<SeriesId> = available.into_iter().collect();
                let missing: Vec<&SeriesId> = self
                    .assembler
                    .series()
                    .iter()
                    .filter(|id| !available.contains(*id))
                    .collect();
                if !missing.is_empty() {
                    tracing::warn!(
                        "{} configured series not in database yet: {:?}",
                        missing.len(),
                        missing
                    );
                }
                tracing::info!("Database reachable, {} series available", available.len());
                SourceStatus::Connected
            }
            Err(e) => {
                tracing::error!("Database unreachable at startup: {}", e);
                SourceStatus::Unreachable(e.to_string())
            }
        };

        *self.status.lock().await = status.clone();
        self.frames.send_modify(|frame| {
            let mut updated = (**frame).clone();
            updated.source = status.clone();
            *frame = Arc::new(updated);
        });
        status
    }

    /// Run one fetch, assemble and render pass and publish its frame
    pub async fn tick(&self, tick: u64) -> Arc<Frame> {
        let assembled = self.assembler.assemble().await;
        let status = self.source_status(&assembled.failures).await;

        let frame = Arc::new(Frame {
            tick,
            generated_at: Utc::now(),
            source: status,
            dashboard: self.panels.render(&assembled.snapshot, &assembled.cache),
        });
        self.frames.send_replace(frame.clone());
        frame
    }

    /// Tick on the configured interval until `shutdown` flips or its sender
    /// is dropped. A tick that overruns the interval makes the next one skip,
    /// so ticks never overlap.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick = 0u64;

        tracing::info!(
            "Monitoring {} series every {:?}",
            self.assembler.series().len(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tick += 1;
                    self.tick(tick).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Monitor stopped after {} ticks", tick);
    }

    async fn source_status(&self, failures: &[(SeriesId, SourceError)]) -> SourceStatus {
        let all_failed = !failures.is_empty() && failures.len() == self.assembler.series().len();
        // A host that drops packets surfaces as timeouts rather than refusals
        let connection_error = failures.iter().find_map(|(_, e)| match e {
            SourceError::Connection(_) | SourceError::Timeout => Some(e),
            SourceError::Query(_) => None,
        });

        let status = match connection_error {
            Some(e) if all_failed => SourceStatus::Unreachable(e.to_string()),
            _ => SourceStatus::Connected,
        };

        let mut current = self.status.lock().await;
        if *current != status {
            match &status {
                SourceStatus::Unreachable(message) => {
                    tracing::error!("Lost connection to database: {}", message)
                }
                SourceStatus::Connected => tracing::info!("Database connection restored"),
            }
            *current = status.clone();
        }
        status
    }
}
