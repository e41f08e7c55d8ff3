//! Greenlight movie catalog API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request ID, trace, timeout, metrics)
//!                         │
//!                         ▼
//!                     http::extract ──▶ jsonio::decode (strict body decoding)
//!                         │
//!                         ▼
//!                     http::movies ──▶ data (Movie, validate_movie, MovieStore)
//!                         │
//!                         ▼
//!     ◀────────────── jsonio::encode (tab-indented envelope)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use greenlight::config::{resolve_config, Environment, Overrides};
use greenlight::data::InMemoryMovieStore;
use greenlight::lifecycle::{signals, Shutdown};
use greenlight::observability::{logging, metrics};
use greenlight::ApiServer;

#[derive(Parser, Debug)]
#[command(name = "greenlight", version, about = "Movie catalog JSON API")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Deployment environment (overrides config)
    #[arg(short, long, value_enum)]
    env: Option<Environment>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        port: cli.port,
        environment: cli.env,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "greenlight starting");
    tracing::info!(
        bind_address = %config.server.bind_address(),
        environment = %config.server.environment,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
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

    let listener = TcpListener::bind(config.server.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::trigger_on_signal(&shutdown).await;
    });

    let server = ApiServer::new(config, Arc::new(InMemoryMovieStore::new()));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
