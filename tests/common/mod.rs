//! Scripted inverter used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use solax_exporter::connection::ConnectionManager;
use solax_exporter::error::{ExporterError, Result};
use solax_exporter::metrics::MetricsSink;
use solax_exporter::source::{
    DeviceEndpoint, DeviceIdentity, InverterSession, Reading, SensorCatalog, TelemetrySource,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Script {
    reachable: bool,
    catalog: Vec<(String, String)>,
    values: Vec<(String, f64)>,
    discover_delay: Option<Duration>,
    fetch_delay: Option<Duration>,
    discoveries: usize,
}

/// Fake inverter whose behaviour can be changed between scrapes
#[derive(Clone, Default)]
pub struct FakeInverter {
    script: Arc<Mutex<Script>>,
}

impl FakeInverter {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        fake.set_catalog(catalog);
        fake.set_reachable(true);
        fake
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.script.lock().unwrap().reachable = reachable;
    }

    /// Catalog handed to sessions discovered from now on
    pub fn set_catalog(&self, catalog: &[(&str, &str)]) {
        self.script.lock().unwrap().catalog = catalog
            .iter()
            .map(|(n, u)| (n.to_string(), u.to_string()))
            .collect();
    }

    pub fn set_values(&self, values: &[(&str, f64)]) {
        self.script.lock().unwrap().values =
            values.iter().map(|(n, v)| (n.to_string(), *v)).collect();
    }

    pub fn set_discover_delay(&self, delay: Duration) {
        self.script.lock().unwrap().discover_delay = Some(delay);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.script.lock().unwrap().fetch_delay = Some(delay);
    }

    pub fn discoveries(&self) -> usize {
        self.script.lock().unwrap().discoveries
    }
}

pub struct FakeSession {
    script: Arc<Mutex<Script>>,
    identity: DeviceIdentity,
    catalog: SensorCatalog,
}

fn identity() -> DeviceIdentity {
    DeviceIdentity {
        serial_number: "SWTEST0001".to_string(),
        inverter_type: "15".to_string(),
        version: "3.003.02".to_string(),
    }
}

#[async_trait]
impl TelemetrySource for FakeInverter {
    type Session = FakeSession;

    async fn discover(&self, _endpoint: &DeviceEndpoint) -> Result<FakeSession> {
        let delay = self.script.lock().unwrap().discover_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock().unwrap();
        script.discoveries += 1;
        if !script.reachable {
            return Err(ExporterError::Discovery("no route to host".to_string()));
        }

        Ok(FakeSession {
            script: Arc::clone(&self.script),
            identity: identity(),
            catalog: script.catalog.iter().cloned().collect(),
        })
    }
}

#[async_trait]
impl InverterSession for FakeSession {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    async fn fetch(&self) -> Result<Reading> {
        let delay = self.script.lock().unwrap().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let script = self.script.lock().unwrap();
        if !script.reachable {
            return Err(ExporterError::Fetch("connection reset".to_string()));
        }

        Ok(Reading {
            identity: self.identity.clone(),
            values: script.values.iter().cloned().collect(),
        })
    }
}

pub fn test_endpoint() -> DeviceEndpoint {
    let mut endpoint = DeviceEndpoint::new("inverter.test", 80);
    endpoint.discovery_timeout = Duration::from_millis(200);
    endpoint.fetch_timeout = Duration::from_millis(200);
    endpoint
}

pub fn manager_for(fake: &FakeInverter) -> ConnectionManager<FakeInverter> {
    let sink = MetricsSink::new().expect("Failed to create metrics sink");
    ConnectionManager::new(fake.clone(), test_endpoint(), sink)
}
