// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::assembler::FetchWindow;
use crate::application::monitor_service::MonitorService;
use crate::application::panels::Panels;
use crate::infrastructure::config::{load_monitor_config, load_panels_config};
use crate::infrastructure::influx_source::InfluxSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{dashboard, health_check, layout, list_series, stream_dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing: RUST_LOG wins, then LOGLEVEL, then info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOGLEVEL").unwrap_or_default().to_lowercase();
        let level = match level.as_str() {
            "warning" => "warn",
            "critical" => "error",
            "trace" | "debug" | "info" | "warn" | "error" => level.as_str(),
            _ => "info",
        };
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_monitor_config()?;
    let panels_config = load_panels_config(&config.monitor.panels_path)?;
    let (panel_layout, catalog) = panels_config.into_parts();

    let missing = panel_layout.missing_metadata(&catalog, &config.monitor.mode);
    if !missing.is_empty() {
        tracing::warn!("No metadata for {:?}, rendering placeholders", missing);
    }

    // Create data source (infrastructure layer)
    let source = Arc::new(
        InfluxSource::new(&config.influx.host, config.influx.port, config.influx.database.clone())
            .with_token(config.influx.token.clone())
            .with_retention_policy(config.influx.retention_policy.clone())
            .with_request_timeout(config.monitor.fetch_timeout()),
    );

    // Create monitor (application layer)
    let panels = Panels {
        layout: panel_layout,
        catalog,
        mode: config.monitor.mode.clone(),
        window_secs: config.monitor.window_secs,
    };
    let window = FetchWindow {
        lookback: config.monitor.lookback(),
        bucket: config.monitor.bucket(),
        timeout: config.monitor.fetch_timeout(),
    };
    let monitor = Arc::new(MonitorService::new(
        source,
        panels,
        window,
        config.monitor.update_interval(),
    ));

    // An unreachable database is reported but the layout is still served
    monitor.probe().await;

    let (stop, shutdown) = watch::channel(false);
    let ticker = tokio::spawn(monitor.clone().run(shutdown));

    let state = Arc::new(AppState { monitor });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/series", get(list_series))
        .route("/layout", get(layout))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting vent-monitor on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    // Stop ticking once the server is down
    let _ = stop.send(true);
    ticker.await?;

    Ok(())
}
