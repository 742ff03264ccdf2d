use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on a single discovery attempt.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single real-time data fetch from an established session.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub solax: SolaxConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolaxConfig {
    /// Inverter address; required, but may arrive via `SOLAX_API_HOST` after loading
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_solax_port")]
    pub port: u16,
    #[serde(default = "default_password")]
    pub password: SecretString,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_solax_port() -> u16 {
    80
}

fn default_password() -> SecretString {
    SecretString::from("")
}

impl Default for SolaxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_solax_port(),
            password: default_password(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SOLAX_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Checks the settings that have no usable default.
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        if self.solax.host.trim().is_empty() {
            return Err(ExporterError::Config(
                "Missing inverter host: set SOLAX_API_HOST or solax.host".to_string(),
            ));
        }
        Ok(())
    }
}
