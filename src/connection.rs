//! Inverter Connection Lifecycle
//!
//! [`ConnectionManager`] owns the single session with the inverter and the
//! [`MetricsSink`] it feeds. Every scrape runs one pass of the state machine:
//!
//! ```text
//!                 discover ok + schema synced
//!  Disconnected ─────────────────────────────► Connected
//!       ▲   │ discover failed / timed out         │  │ fetch ok
//!       │   └──────────► (stay, up=0)             │  └──► (stay, up=1)
//!       │                                         │
//!       └──────────────── fetch failed ───────────┘  (up=0, session dropped)
//! ```
//!
//! Failures never escape a scrape: they are logged and surface only through
//! the `solax_up` gauge. A dropped session forces rediscovery on the next
//! scrape, which may yield a different sensor catalog and therefore a new
//! schema.

use crate::error::{ExporterError, Result};
use crate::metrics::MetricsSink;
use crate::schema::{self, Schema};
use crate::source::{DeviceEndpoint, InverterSession, Reading, TelemetrySource};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// A session together with the schema synced from its catalog
pub struct ActiveSession<T> {
    pub session: T,
    pub schema: Schema,
}

pub enum ConnectionState<T> {
    Disconnected,
    Connected(ActiveSession<T>),
}

/// What a single scrape ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Fetch succeeded; `written` values landed in the sink, `dropped` had no
    /// matching metric
    Updated { written: usize, dropped: usize },
    /// No session could be established
    DiscoveryFailed,
    /// The session stopped answering and was discarded
    FetchFailed,
}

pub struct ConnectionManager<S: TelemetrySource> {
    source: S,
    endpoint: DeviceEndpoint,
    state: ConnectionState<S::Session>,
    sink: MetricsSink,
}

impl<S: TelemetrySource> ConnectionManager<S> {
    pub fn new(source: S, endpoint: DeviceEndpoint, sink: MetricsSink) -> Self {
        Self {
            source,
            endpoint,
            state: ConnectionState::Disconnected,
            sink,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    pub fn state(&self) -> &ConnectionState<S::Session> {
        &self.state
    }

    pub fn sink(&self) -> &MetricsSink {
        &self.sink
    }

    /// Render the sink without touching the inverter
    pub fn render(&self) -> Result<String> {
        self.sink.render()
    }

    /// Establish a session if there is none.
    ///
    /// Returns `true` when a session is available afterwards.
    pub async fn connect(&mut self) -> bool {
        if self.is_connected() {
            return true;
        }

        match self.establish().await {
            Ok(active) => {
                info!(
                    "Connected to Solax inverter {} ({}, firmware {}) with {} sensors",
                    active.session.identity().serial_number,
                    active.session.identity().inverter_type,
                    active.session.identity().version,
                    active.schema.len()
                );
                self.state = ConnectionState::Connected(active);
                self.sink.set_liveness(true);
                true
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", self.endpoint.host, e);
                self.sink.set_liveness(false);
                false
            }
        }
    }

    async fn establish(&mut self) -> Result<ActiveSession<S::Session>> {
        let limit = self.endpoint.discovery_timeout;
        let session = timeout(limit, self.source.discover(&self.endpoint))
            .await
            .map_err(|_| ExporterError::DiscoveryTimeout(limit))??;

        // A rejected catalog must not leave the previous session's gauges behind
        let schema = match schema::sync_schema(session.catalog()) {
            Ok(schema) => schema,
            Err(e) => {
                self.sink.clear_sensors();
                return Err(e);
            }
        };
        self.sink.replace_schema(&schema)?;

        Ok(ActiveSession { session, schema })
    }

    /// Handle one metrics request: (re)discover if needed, then fetch
    pub async fn scrape(&mut self) -> ScrapeOutcome {
        if !self.connect().await {
            return ScrapeOutcome::DiscoveryFailed;
        }

        let ConnectionState::Connected(active) = &self.state else {
            return ScrapeOutcome::DiscoveryFailed;
        };

        let limit = self.endpoint.fetch_timeout;
        let fetched = timeout(limit, active.session.fetch())
            .await
            .unwrap_or(Err(ExporterError::FetchTimeout(limit)));

        match fetched {
            Ok(reading) => {
                let (written, dropped) = apply_reading(&mut self.sink, &active.schema, &reading);
                self.sink.set_liveness(true);
                debug!("Scrape stored {} values ({} dropped)", written, dropped);
                ScrapeOutcome::Updated { written, dropped }
            }
            Err(e) => {
                error!("Lost connection to Solax inverter: {}", e);
                self.sink.set_liveness(false);
                self.state = ConnectionState::Disconnected;
                ScrapeOutcome::FetchFailed
            }
        }
    }
}

/// Copy a reading into the sink. Returns (written, dropped).
fn apply_reading(sink: &mut MetricsSink, schema: &Schema, reading: &Reading) -> (usize, usize) {
    sink.set_info(
        &reading.identity.serial_number,
        &reading.identity.inverter_type,
        &reading.identity.version,
    );

    let mut written = 0;
    let mut dropped = 0;

    for (name, value) in &reading.values {
        let stored = match schema.definition(name) {
            Some(definition) => sink.set_value(&definition.id, *value),
            None => Err(ExporterError::SchemaInconsistency(format!(
                "sensor '{}' is not part of the session schema",
                name
            ))),
        };

        match stored {
            Ok(()) => written += 1,
            Err(e) => {
                warn!("Dropping value for '{}': {}", name, e);
                dropped += 1;
            }
        }
    }

    (written, dropped)
}
