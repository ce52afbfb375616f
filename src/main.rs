//! Stream aggregation addon server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────────┐
//!                     │                      STREAM ADDON                         │
//!                     │                                                           │
//!   Client Request    │  ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐ │
//!   ──────────────────┼─▶│  http   │──▶│  codec   │──▶│  path +  │──▶│ config  │ │
//!                     │  │ server  │   │ (base64) │   │ request  │   │validator│ │
//!                     │  └─────────┘   └──────────┘   └──────────┘   └────┬────┘ │
//!                     │                                                   │      │
//!   Client Response   │  ┌─────────┐                  ┌──────────┐        ▼      │
//!   ◀─────────────────┼──│response │◀─────────────────│  engine  │◀── dispatch   │──▶ Upstream
//!                     │  │envelopes│                  │(upstream)│               │    addons
//!                     │  └─────────┘                  └──────────┘               │
//!                     └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use stream_addon::config::load_config;
use stream_addon::observability::{logging, metrics};
use stream_addon::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "stream-addon")]
#[command(about = "Stream aggregation addon server", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT and the config file).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.port)?;

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!("stream-addon v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        static_root = %config.static_files.root.display(),
        upstream_timeout_secs = config.engine.upstream_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by validate_config.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        "Server is running at http://localhost:{}",
        listener.local_addr()?.port()
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::with_default_engine(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
