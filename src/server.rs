//! HTTP Server
//!
//! Axum server exposing the exporter to Prometheus.
//!
//! # Endpoints
//!
//! - `GET /` - Plain-text pointer to the metrics endpoint
//! - `GET /metrics` - Runs one scrape against the inverter, then returns the
//!   Prometheus text exposition
//!
//! # Scrape Serialization
//!
//! The [`ConnectionManager`] sits behind a single async mutex, so concurrent
//! `/metrics` requests queue up and each one runs a complete scrape on its own.
//! There is no background collection loop; the inverter is only contacted
//! when Prometheus asks.
//!
//! # Error Handling
//!
//! Inverter failures never turn into HTTP errors. They are logged and show up
//! as `solax_up 0` in an otherwise normal 200 response.

use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::error::ExporterError;
use crate::metrics::MetricsSink;
use crate::solax::SolaxClient;
use crate::source::{DeviceEndpoint, TelemetrySource};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

struct AppState<S: TelemetrySource> {
    manager: Arc<Mutex<ConnectionManager<S>>>,
}

impl<S: TelemetrySource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let endpoint = DeviceEndpoint::from(&config.solax);
    let sink = MetricsSink::new()?;
    let mut manager = ConnectionManager::new(SolaxClient::new(), endpoint, sink);

    // First contact happens at startup; an unreachable inverter is not fatal
    if !manager.connect().await {
        warn!("Inverter not reachable at startup, will retry on the next scrape");
    }

    let app = router(Arc::new(Mutex::new(manager)));

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router around an already constructed connection manager
pub fn router<S>(manager: Arc<Mutex<ConnectionManager<S>>>) -> Router
where
    S: TelemetrySource + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler::<S>))
        .with_state(AppState { manager })
}

async fn root_handler() -> impl IntoResponse {
    "Prometheus metrics available on /metrics"
}

async fn metrics_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: TelemetrySource + 'static,
{
    let mut manager = state.manager.lock().await;
    let outcome = manager.scrape().await;
    info!("Scrape finished: {:?}", outcome);

    match manager.render() {
        Ok(metrics) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], metrics).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}
