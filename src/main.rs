//! Cell monitor service.
//!
//! # Architecture Overview
//!
//! ```text
//!   LAN client                ┌──────────────────────────────────────────────┐
//!   (phone browser)           │                CELL MONITOR                   │
//!  ───────────────────────────┼─▶ net::listener ─▶ http::server (axum)        │
//!                             │                     │        │               │
//!                             │          /api/*     ▼        ▼  everything   │
//!                             │              cells::access   ServeDir  else   │
//!                             │                     │                         │
//!                             │                     ▼                         │
//!                             │               db (bb8 + tiberius) ──────────┼──▶ SQL Server
//!                             │                                              │
//!                             │  lifecycle: start / stop / 3 s drain         │
//!                             │  observability: tracing + log callback       │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use cell_monitor::config::{load_config, ServiceConfig};
use cell_monitor::db::MemoryConnector;
use cell_monitor::lifecycle::shutdown_signal;
use cell_monitor::observability::logging;
use cell_monitor::Service;

const DEFAULT_CONFIG_PATH: &str = "cell-monitor.toml";

#[derive(Parser)]
#[command(name = "cell-monitor")]
#[command(about = "Serve warehouse cell status to LAN clients", long_about = None)]
struct Args {
    /// TOML configuration file. A missing default file means built-in defaults.
    #[arg(short, long, env = "CELL_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP port from the configuration.
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve seeded in-memory cells instead of connecting to SQL Server.
    #[arg(long)]
    demo: bool,
}

fn read_config(args: &Args) -> anyhow::Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(Path::new(DEFAULT_CONFIG_PATH))
            .with_context(|| format!("loading config from {DEFAULT_CONFIG_PATH}"))?,
        None => ServiceConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = read_config(&args)?;

    logging::init(&config.observability).context("initializing logging")?;

    tracing::info!("cell-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.port,
        static_dir = %config.static_dir.display(),
        database = ?config.database,
        demo = args.demo,
        "Configuration loaded"
    );

    let service = if args.demo {
        Service::new(MemoryConnector::sample())
    } else {
        Service::mssql()
    };
    service.set_log_callback(|line| println!("{line}"));

    let url = service.start(&config).await?;
    tracing::info!(url = %url, "Ready");

    shutdown_signal().await;
    service.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
