//! Solax Inverter Prometheus Exporter
//!
//! A Prometheus metrics exporter for Solax solar inverters reachable on the
//! local network.
//!
//! # Overview
//!
//! Every `/metrics` request triggers one scrape: the exporter (re)discovers the
//! inverter if needed, reads its real-time data and republishes each sensor as
//! a gauge. Connection problems never fail the request; they are reported via
//! `solax_up 0`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    HTTP (local)     ┌──────────────────────────┐
//! │   Solax     │ ◄─────────────────► │        Exporter          │
//! │  Inverter   │  ReadRealTimeData   │                          │
//! └─────────────┘                     │  ┌────────────────────┐  │      HTTP      ┌────────────┐
//!                                     │  │ ConnectionManager  │  │ ◄────────────► │ Prometheus │
//!                                     │  └────────────────────┘  │   /metrics     └────────────┘
//!                                     │  ┌────────┐ ┌────────┐   │
//!                                     │  │ Schema │ │  Sink  │   │
//!                                     │  └────────┘ └────────┘   │
//!                                     └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`solax`] - Solax local API client and inverter model tables
//! - [`source`] - Trait boundary between the state machine and the inverter
//! - [`connection`] - Connection lifecycle state machine and scrape logic
//! - [`schema`] - Sensor name sanitization and metric schema sync
//! - [`metrics`] - Prometheus metrics sink
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use solax_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod server;
pub mod solax;
pub mod source;
