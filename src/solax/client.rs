//! Solax Local API Client
//!
//! Solax inverters (and their Pocket WiFi dongles) expose real-time data over
//! plain HTTP on the local network. Different firmware generations want the
//! request phrased differently, so discovery probes every known
//! [`InverterModel`] at once and keeps the first one whose answer decodes.
//!
//! # Example
//!
//! ```no_run
//! use solax_exporter::solax::SolaxClient;
//! use solax_exporter::source::{DeviceEndpoint, InverterSession, TelemetrySource};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let endpoint = DeviceEndpoint::new("192.168.1.50", 80);
//! let session = SolaxClient::new().discover(&endpoint).await?;
//! let reading = session.fetch().await?;
//! println!("{:?}", reading.values.get("Battery Power"));
//! # Ok(())
//! # }
//! ```

use crate::error::{ExporterError, Result};
use crate::solax::inverter::{InverterModel, Transport, MODELS};
use crate::solax::types::RealTimeResponse;
use crate::source::{
    DeviceEndpoint, DeviceIdentity, InverterSession, Reading, SensorCatalog, TelemetrySource,
};
use async_trait::async_trait;
use futures_util::future::select_ok;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::debug;

const READ_REAL_TIME_DATA: &str = "ReadRealTimeData";

/// Client for the Solax local real-time API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Default)]
pub struct SolaxClient {
    http: reqwest::Client,
}

impl SolaxClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the real-time data request the way `model` expects it
    async fn request(
        &self,
        endpoint: &DeviceEndpoint,
        model: &InverterModel,
    ) -> Result<RealTimeResponse> {
        let base = endpoint.base_url();
        let password = endpoint.password.expose_secret();

        let request = match model.transport {
            Transport::PostForm { forwarded_for } => {
                let request = self
                    .http
                    .post(format!("{}/", base))
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(format!("optType={}&pwd={}", READ_REAL_TIME_DATA, password));
                if forwarded_for {
                    request.header("X-Forwarded-For", "5.8.8.8")
                } else {
                    request
                }
            }
            Transport::PostQuery => {
                let url = reqwest::Url::parse_with_params(
                    &format!("{}/", base),
                    &[("optType", READ_REAL_TIME_DATA), ("pwd", password)],
                )
                .map_err(|e| ExporterError::Config(format!("invalid inverter address: {}", e)))?;
                self.http.post(url)
            }
            Transport::Get { path } => self.http.get(format!("{}{}", base, path)),
        };

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!("{} response: {}", model.name, body);

        Ok(serde_json::from_str(&body)?)
    }

    async fn probe(
        &self,
        endpoint: &DeviceEndpoint,
        model: &'static InverterModel,
    ) -> Result<SolaxSession> {
        let response = self.request(endpoint, model).await?;
        let reading = model.decode(response)?;

        Ok(SolaxSession {
            client: self.clone(),
            endpoint: endpoint.clone(),
            model,
            identity: reading.identity,
            catalog: model.catalog(),
        })
    }
}

#[async_trait]
impl TelemetrySource for SolaxClient {
    type Session = SolaxSession;

    async fn discover(&self, endpoint: &DeviceEndpoint) -> Result<SolaxSession> {
        let probes = MODELS
            .iter()
            .map(|&model| Box::pin(self.probe(endpoint, model)));

        match select_ok(probes).await {
            Ok((session, _)) => {
                debug!("Inverter at {} answered as {}", endpoint.host, session.model.name);
                Ok(session)
            }
            Err(e) => Err(ExporterError::Discovery(format!(
                "Unable to connect to the inverter at host={} port={}, or the model is not supported yet (last error: {})",
                endpoint.host, endpoint.port, e
            ))),
        }
    }
}

/// An inverter whose model has been identified
pub struct SolaxSession {
    client: SolaxClient,
    endpoint: DeviceEndpoint,
    model: &'static InverterModel,
    identity: DeviceIdentity,
    catalog: SensorCatalog,
}

impl SolaxSession {
    pub fn model(&self) -> &'static InverterModel {
        self.model
    }
}

#[async_trait]
impl InverterSession for SolaxSession {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    async fn fetch(&self) -> Result<Reading> {
        let response = self
            .client
            .request(&self.endpoint, self.model)
            .await
            .map_err(|e| ExporterError::Fetch(e.to_string()))?;

        self.model
            .decode(response)
            .map_err(|e| ExporterError::Fetch(e.to_string()))
    }
}
