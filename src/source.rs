//! Telemetry Source Boundary
//!
//! The connection state machine only talks to an inverter through the
//! [`TelemetrySource`] and [`InverterSession`] traits defined here. The Solax
//! HTTP implementation lives in [`crate::solax`]; tests plug in scripted fakes.

use crate::config::{SolaxConfig, DISCOVERY_TIMEOUT, FETCH_TIMEOUT};
use crate::error::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::time::Duration;

/// Where the inverter lives and how long we are willing to wait for it.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub password: SecretString,
    pub discovery_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: SecretString::from(""),
            discovery_timeout: DISCOVERY_TIMEOUT,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    /// Base URL of the inverter's local web server
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl From<&SolaxConfig> for DeviceEndpoint {
    fn from(config: &SolaxConfig) -> Self {
        Self {
            password: config.password.clone(),
            ..Self::new(config.host.clone(), config.port)
        }
    }
}

/// Identity fields reported by the inverter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceIdentity {
    pub serial_number: String,
    pub inverter_type: String,
    pub version: String,
}

/// Raw sensor name -> unit of measurement, as reported for one session.
///
/// Names are unique within a catalog; iteration order is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensorCatalog {
    sensors: BTreeMap<String, String>,
}

impl SensorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, unit: impl Into<String>) {
        self.sensors.insert(name.into(), unit.into());
    }

    pub fn unit(&self, name: &str) -> Option<&str> {
        self.sensors.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sensors.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

impl<N, U> FromIterator<(N, U)> for SensorCatalog
where
    N: Into<String>,
    U: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, U)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (name, unit) in iter {
            catalog.insert(name, unit);
        }
        catalog
    }
}

/// Result of one successful fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    pub identity: DeviceIdentity,
    pub values: BTreeMap<String, f64>,
}

/// A live connection to a discovered inverter
#[async_trait]
pub trait InverterSession: Send + Sync {
    /// Identity captured at discovery time
    fn identity(&self) -> &DeviceIdentity;

    /// Sensors this session can report; fixed for the lifetime of the session
    fn catalog(&self) -> &SensorCatalog;

    /// Query the current telemetry
    async fn fetch(&self) -> Result<Reading>;
}

/// Something that can locate an inverter and open a session with it
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    type Session: InverterSession + 'static;

    /// Locate the inverter behind `endpoint`.
    ///
    /// Callers bound this with `endpoint.discovery_timeout`; implementations
    /// do not need to enforce it themselves.
    async fn discover(&self, endpoint: &DeviceEndpoint) -> Result<Self::Session>;
}
