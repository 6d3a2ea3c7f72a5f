// HTTP request handlers
use crate::domain::catalog::Catalog;
use crate::domain::layout::Layout;
use crate::infrastructure::chunked_frames::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

/// Everything a client needs to draw the dashboard before data arrives
#[derive(Serialize)]
struct LayoutView<'a> {
    mode: &'a str,
    window_secs: f64,
    layout: &'a Layout,
    catalog: &'a Catalog,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the series currently present in the database
pub async fn list_series(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);

    let response = match state.monitor.list_series().await {
        Ok(series) => json_response(&series, StatusCode::OK, compress).await,
        Err(e) => {
            tracing::error!("Error listing series: {}", e);
            let body = ErrorBody {
                error: e.to_string(),
            };
            json_response(&body, StatusCode::SERVICE_UNAVAILABLE, compress).await
        }
    };

    match response {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Static layout and series metadata
pub async fn layout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let panels = state.monitor.panels();
    let view = LayoutView {
        mode: &panels.mode,
        window_secs: panels.window_secs,
        layout: &panels.layout,
        catalog: &panels.catalog,
    };

    match json_response(&view, StatusCode::OK, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Latest rendered frame
pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.monitor.latest();

    match json_response(&*frame, StatusCode::OK, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream every frame as it is published
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.monitor.subscribe(), accepts_brotli(&headers))
}
