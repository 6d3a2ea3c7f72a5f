// InfluxDB series source implementation
use crate::application::series_source::{SeriesSource, SourceError};
use crate::domain::series::{Sample, SeriesId};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug)]
pub struct InfluxSource {
    base_url: String,
    database: String,
    retention_policy: Option<String>,
    token: Option<String>,
    request_timeout: Duration,
    client: OnceCell<Client>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxSource {
    pub fn new(host: &str, port: u16, database: String) -> Self {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, port)
        } else {
            format!("http://{}:{}", host, port)
        };

        Self {
            base_url,
            database,
            retention_policy: None,
            token: None,
            request_timeout: Duration::from_secs(5),
            client: OnceCell::new(),
        }
    }

    pub fn with_retention_policy(mut self, retention_policy: Option<String>) -> Self {
        self.retention_policy = retention_policy.filter(|rp| !rp.is_empty());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The HTTP client is built on first use and reused afterwards
    async fn client(&self) -> Result<&Client, SourceError> {
        self.client
            .get_or_try_init(|| async {
                Client::builder()
                    .timeout(self.request_timeout)
                    .build()
                    .map_err(|e| SourceError::Connection(e.to_string()))
            })
            .await
    }

    fn build_query_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/query?db={}&epoch=ns&q={}",
            self.base_url,
            urlencoding::encode(&self.database),
            urlencoding::encode(query)
        );
        if let Some(rp) = &self.retention_policy {
            url.push_str("&rp=");
            url.push_str(&urlencoding::encode(rp));
        }
        url
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse, SourceError> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing InfluxQL query: {}", query);

        let mut request = self
            .client()
            .await?
            .get(&url)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

#[async_trait]
impl SeriesSource for InfluxSource {
    async fn list_series(&self) -> Result<Vec<SeriesId>, SourceError> {
        let response = self.execute_query("SHOW MEASUREMENTS").await?;
        Ok(measurement_names(&response))
    }

    async fn fetch_recent(
        &self,
        series: &str,
        lookback: Duration,
        bucket: Duration,
    ) -> Result<Vec<Sample>, SourceError> {
        validate_series(series)?;
        let query = mean_query(series, lookback, bucket);

        // One time origin for the whole call, taken before the query goes out
        let now_ns = Utc::now()
            .timestamp_nanos_opt()
            .ok_or_else(|| SourceError::Query("system clock out of range".to_string()))?;

        let response = self.execute_query(&query).await?;
        Ok(relative_samples(&response, now_ns))
    }
}

/// Series names are quoted into the query, so reject anything that could
/// break out of the identifier
fn validate_series(series: &str) -> Result<(), SourceError> {
    if series.is_empty() {
        return Err(SourceError::Query("empty series identifier".to_string()));
    }
    if series
        .chars()
        .any(|c| c == '"' || c == '\\' || c.is_control())
    {
        return Err(SourceError::Query(format!(
            "malformed series identifier {:?}",
            series
        )));
    }
    Ok(())
}

fn mean_query(series: &str, lookback: Duration, bucket: Duration) -> String {
    format!(
        "SELECT mean(\"value\") FROM \"{}\" WHERE time > now() - {}ms GROUP BY time({}ms) fill(none)",
        series,
        lookback.as_millis(),
        bucket.as_millis().max(1)
    )
}

/// Turn a raw `/query` reply into its results, mapping a rejected status or a
/// statement error to `SourceError::Query`
fn parse_response(status: StatusCode, body: &str) -> Result<InfluxQLResponse, SourceError> {
    if !status.is_success() {
        return Err(SourceError::Query(format!(
            "InfluxDB responded with status {}: {}",
            status, body
        )));
    }

    let data: InfluxQLResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Query(format!("Failed to parse InfluxDB response: {}", e)))?;

    if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
        return Err(SourceError::Query(format!("InfluxDB query error: {}", error)));
    }

    Ok(data)
}

fn measurement_names(response: &InfluxQLResponse) -> Vec<SeriesId> {
    response
        .results
        .iter()
        .flat_map(|r| r.series.iter().flatten())
        .flat_map(|s| s.values.iter())
        .filter_map(|row| row.first().and_then(|v| v.as_str()).map(String::from))
        .collect()
}

fn relative_samples(response: &InfluxQLResponse, now_ns: i64) -> Vec<Sample> {
    let mut samples = Vec::new();

    for s in response.results.iter().flat_map(|r| r.series.iter().flatten()) {
        let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = s.columns.iter().position(|c| c == "mean").unwrap_or(1);

        for row in &s.values {
            let time = row.get(time_idx).and_then(|v| v.as_i64());
            let value = row.get(value_idx).and_then(|v| v.as_f64());
            if let (Some(time), Some(value)) = (time, value) {
                // Database clock running ahead must not produce future samples
                let relative = ((time - now_ns) as f64 / NANOS_PER_SEC).min(0.0);
                samples.push(Sample::new(relative, value));
            }
        }
    }

    samples.sort_by(|a, b| a.time.total_cmp(&b.time));
    samples
}
