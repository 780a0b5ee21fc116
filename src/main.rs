//! OpenSky credential-brokering proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                OPENSKY PROXY                 │
//!                        │                                              │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌──────────┐  │
//!   ────────────────────────▶  http   │──▶│ security │──▶│ handlers │  │
//!                        │  │ server  │   │  secret  │   │          │  │
//!                        │  └─────────┘   └──────────┘   └────┬─────┘  │
//!                        │                                    │        │
//!                        │              fresh hit? ┌──────────▼─────┐  │
//!                        │             ┌───────────│ response cache │  │
//!                        │             │           └──────────┬─────┘  │
//!                        │             │                 miss │        │
//!                        │             │   ┌──────────┐  ┌───▼──────┐ │
//!   Client Response      │             │   │   auth   │─▶│resilience│─┼──▶ OpenSky
//!   ◀───────────────────────────────────   │ provider │  │  fetch   │ │    API
//!                        │                 └──────────┘  └──────────┘ │
//!                        │                                            │
//!                        │  ┌──────────────────────────────────────┐  │
//!                        │  │        Cross-Cutting Concerns        │  │
//!                        │  │  config · observability · lifecycle  │  │
//!                        │  └──────────────────────────────────────┘  │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use opensky_proxy::config::{self, ProxyConfig};
use opensky_proxy::lifecycle::{wait_for_signal, Shutdown};
use opensky_proxy::observability::{logging, metrics};
use opensky_proxy::{AppState, HttpServer};

#[derive(Parser)]
#[command(name = "opensky-proxy")]
#[command(about = "Credential-brokering proxy for the OpenSky flight-state API", long_about = None)]
struct Cli {
    /// Path to a TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding config and the PORT variable.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config: ProxyConfig = config::load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability.log_filter);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.listener.host,
        port = config.listener.port,
        states_url = %config.upstream.states_url,
        cache_ms = config.states_fetch.cache_ms,
        secret_configured = config.security.proxy_secret.is_some(),
        "opensky-proxy starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState::new(config)?;
    let server = HttpServer::new(state);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
