use anyhow::Result;
use clap::Parser;
use solax_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Inverter host or IP address (overrides config)
    #[arg(long, env = "SOLAX_API_HOST")]
    solax_host: Option<String>,

    /// Inverter HTTP port (overrides config)
    #[arg(long, env = "SOLAX_API_PORT")]
    solax_port: Option<u16>,

    /// Inverter password, usually the dongle registration number (overrides config)
    #[arg(long, env = "SOLAX_API_PASSWORD")]
    solax_password: Option<String>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR", default_value = "0.0.0.0")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Solax Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(host) = args.solax_host {
        config.solax.host = host;
    }
    if let Some(port) = args.solax_port {
        config.solax.port = port;
    }
    if let Some(password) = args.solax_password {
        config.solax.password = secrecy::SecretString::new(password.into());
    }
    config.server.port = args.port;
    config.server.addr = args.addr;

    config.validate()?;

    info!("Configuration loaded successfully");
    info!("Solax inverter: {}:{}", config.solax.host, config.solax.port);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
