//! Configuration validation tests
//!
//! Tests that verify configuration defaults and structure.

use secrecy::{ExposeSecret, SecretString};
use solax_exporter::config::{Config, ServerConfig, SolaxConfig, DISCOVERY_TIMEOUT, FETCH_TIMEOUT};
use solax_exporter::source::DeviceEndpoint;
use std::time::Duration;

#[test]
fn test_default_server_config() {
    // Given: ServerConfig with default values
    let config = ServerConfig::default();

    // Then: Should listen on all interfaces, port 8080
    assert_eq!(config.addr, "0.0.0.0");
    assert_eq!(config.port, 8080);
}

#[test]
fn test_default_solax_config() {
    // Given: SolaxConfig with default values
    let config = SolaxConfig::default();

    // Then: Host is unset, the inverter web server is on port 80, no password
    assert!(config.host.is_empty());
    assert_eq!(config.port, 80);
    assert_eq!(config.password.expose_secret(), "");
}

#[test]
fn test_missing_host_fails_validation() {
    // Given: A config without an inverter host
    let config = Config {
        solax: SolaxConfig::default(),
        server: ServerConfig::default(),
    };

    // When: Validating
    let err = config.validate().unwrap_err();

    // Then: The error names the missing setting
    let message = err.to_string();
    assert!(message.contains("Configuration error"));
    assert!(message.contains("SOLAX_API_HOST"));
}

#[test]
fn test_whitespace_host_fails_validation() {
    let config = Config {
        solax: SolaxConfig {
            host: "   ".to_string(),
            ..SolaxConfig::default()
        },
        server: ServerConfig::default(),
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_host_passes_validation() {
    let config = Config {
        solax: SolaxConfig {
            host: "192.168.1.50".to_string(),
            ..SolaxConfig::default()
        },
        server: ServerConfig::default(),
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_load_without_file_uses_defaults() {
    // Given: A config path that does not exist
    // When: Loading
    let config = Config::load("does/not/exist").expect("Failed to load configuration");

    // Then: Server defaults apply
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.solax.port, 80);
}

#[test]
fn test_endpoint_from_config() {
    // Given: A populated SolaxConfig
    let config = SolaxConfig {
        host: "inverter.lan".to_string(),
        port: 8081,
        password: SecretString::from("SXABCDEF"),
    };

    // When: Building the device endpoint
    let endpoint = DeviceEndpoint::from(&config);

    // Then: Address, password and fixed timeouts are carried over
    assert_eq!(endpoint.base_url(), "http://inverter.lan:8081");
    assert_eq!(endpoint.password.expose_secret(), "SXABCDEF");
    assert_eq!(endpoint.discovery_timeout, DISCOVERY_TIMEOUT);
    assert_eq!(endpoint.fetch_timeout, FETCH_TIMEOUT);
    assert_eq!(DISCOVERY_TIMEOUT, Duration::from_secs(5));
}
