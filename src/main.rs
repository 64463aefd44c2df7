//! cors-gate
//!
//! Serves a catch-all demo application behind the origin policy filter.
//!
//! ```text
//! Client Request
//!     → TraceLayer → TimeoutLayer
//!     → CORS middleware (resolve route, evaluate rules)
//!     → handler
//!     → CORS middleware (write Access-Control-Allow-Origin)
//! Client Response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cors_gate::config::{load_config, watcher::ConfigWatcher, GateConfig};
use cors_gate::lifecycle::{wait_for_signal, Shutdown};
use cors_gate::observability::{logging, metrics};
use cors_gate::HttpServer;

#[derive(Parser)]
#[command(name = "cors-gate")]
#[command(about = "Route-scoped Access-Control-Allow-Origin filter", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not reload the configuration file on change.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        rules = config.cors.rules.as_ref().map(Vec::len),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) if !args.no_watch => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
