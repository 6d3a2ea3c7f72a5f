// Data source trait for time-series access
use crate::domain::series::{Sample, SeriesId};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Database unreachable
    #[error("connection failed: {0}")]
    Connection(String),

    /// Malformed series identifier or query rejected by the backend
    #[error("query failed: {0}")]
    Query(String),

    #[error("query timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else {
            SourceError::Query(err.to_string())
        }
    }
}

#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// List every series currently present in the database
    async fn list_series(&self) -> Result<Vec<SeriesId>, SourceError>;

    /// Mean of `series` in `bucket`-wide buckets over the trailing `lookback`,
    /// empty buckets omitted. Times are relative to one "now" captured when the
    /// query is issued. No data in the window is `Ok` with an empty vec.
    async fn fetch_recent(
        &self,
        series: &str,
        lookback: Duration,
        bucket: Duration,
    ) -> Result<Vec<Sample>, SourceError>;
}
