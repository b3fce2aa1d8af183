//! Tunnel proxy server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────┐
//!                       │               TUNNEL PROXY               │
//!    Client Request     │  ┌────────┐   ┌──────────┐   ┌────────┐  │
//!   ────────────────────┼─▶│ server │──▶│  proxy   │──▶│ client │──┼──▶ Upstream
//!                       │  └────────┘   │ /redirect│   └────────┘  │
//!                       │       │       └────┬─────┘               │
//!    /tunnel_update ────┼─▶ admin ──swap──▶ upstream target        │
//!    /status, /health   │                                          │
//!                       └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

use tunnel_proxy::config::{load_config, ProxyMode};
use tunnel_proxy::http::HttpServer;
use tunnel_proxy::lifecycle::{wait_for_signal, Shutdown};
use tunnel_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tunnel-proxy")]
#[command(about = "Reverse proxy with a runtime-replaceable upstream", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the forwarding mode.
    #[arg(short, long, value_enum)]
    mode: Option<ProxyMode>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    tracing::info!("tunnel-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref()).map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    tracing::info!(
        port = config.listener.port,
        mode = %config.mode,
        upstream = %config.upstream.default_url,
        environment = %config.environment,
        forward_timeout_secs = config.timeouts.forward_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = wait_for_signal() => {}
    }

    shutdown.trigger();
    match tokio::time::timeout(grace, server_task).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, forcing exit"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
