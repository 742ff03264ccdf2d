use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Discovery timed out after {0:?}")]
    DiscoveryTimeout(Duration),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(String),

    #[error("Inverter response error: {0}")]
    InverterResponse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
