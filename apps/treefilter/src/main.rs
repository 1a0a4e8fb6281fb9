//! # treefilter
//!
//! The main binary for the treefilter category filter engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) hosting one filter session
//! - CLI interface for merging trees and applying toggles offline
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │          apps/treefilter (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌─────────────┐      │
//! │   │    CLI      │        │  HTTP API   │      │
//! │   │   (clap)    │        │   (axum)    │      │
//! │   └──────┬──────┘        └──────┬──────┘      │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │            ┌───────────────────┐              │
//! │            │  treefilter-core  │              │
//! │            │   (THE ENGINE)    │              │
//! │            └───────────────────┘              │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! treefilter serve --host 0.0.0.0 --port 8080 --tree categories.json
//!
//! # Offline operations
//! treefilter validate -t categories.json
//! treefilter apply -t categories.json -s state.json --set 12=false -o state.json
//! ```

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use treefilter::cli::{self, Cli};
use treefilter::config::{Config, LogConfig, LogFormat};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, warnings) = match Config::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_tracing(&config.log, cli.verbose);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("treefilter=debug,treefilter_core=debug,tower_http=debug")
        } else {
            EnvFilter::new(&log.filter)
        }
    });

    match log.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
