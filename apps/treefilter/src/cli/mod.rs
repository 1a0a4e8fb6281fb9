//! # treefilter CLI Module
//!
//! This module implements the CLI interface for treefilter.
//!
//! ## Available Commands
//!
//! - `serve` - Host a filter session over HTTP
//! - `apply` - Merge a category tree with a saved state and apply toggles
//! - `validate` - Check a raw category tree without applying it

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use treefilter_core::{CategoryId, FilterError};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// treefilter - tri-state category filters
///
/// Keeps category checkbox trees consistent across toggles and refreshes.
#[derive(Parser, Debug)]
#[command(name = "treefilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ./treefilter.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Raw category tree to load before serving
        #[arg(short, long)]
        tree: Option<PathBuf>,
    },

    /// Merge a raw tree with an optional saved state and apply toggles
    Apply {
        /// Raw category tree (JSON list, or object with a `tree` list)
        #[arg(short, long)]
        tree: PathBuf,

        /// Selection state written by a previous `apply --output`
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Toggle to apply, as ID=true|false (repeatable, applied in order)
        #[arg(long = "set", value_parser = parse_toggle)]
        toggles: Vec<(CategoryId, bool)>,

        /// Check (true) or uncheck (false) every category before toggles
        #[arg(long)]
        all: Option<bool>,

        /// Only report checked ids under this category
        #[arg(short, long)]
        root: Option<u64>,

        /// Write the resulting selection state to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a raw category tree
    Validate {
        /// Raw category tree (JSON list, or object with a `tree` list)
        #[arg(short, long)]
        tree: PathBuf,
    },
}

/// Parse an `ID=BOOL` toggle argument.
pub fn parse_toggle(arg: &str) -> Result<(CategoryId, bool), String> {
    let (id, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ID=true|false, got '{}'", arg))?;
    let id: u64 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid category id '{}'", id))?;
    let value: bool = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value '{}', expected true or false", value))?;
    Ok((CategoryId(id), value))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli, mut config: Config) -> Result<(), FilterError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Serve { host, port, tree } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config, tree.as_deref()).await
        }
        Commands::Apply {
            tree,
            state,
            toggles,
            all,
            root,
            output,
        } => {
            let request = ApplyRequest {
                tree,
                state,
                toggles,
                all,
                root: root.map(CategoryId),
                output,
            };
            cmd_apply(&request, json_mode)
        }
        Commands::Validate { tree } => cmd_validate(&tree, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_toggle_accepts_id_and_bool() {
        assert_eq!(parse_toggle("12=false"), Ok((CategoryId(12), false)));
        assert_eq!(parse_toggle(" 3 = true "), Ok((CategoryId(3), true)));
    }

    #[test]
    fn parse_toggle_rejects_garbage() {
        assert!(parse_toggle("12").is_err());
        assert!(parse_toggle("x=true").is_err());
        assert!(parse_toggle("12=yes").is_err());
    }

    #[test]
    fn cli_parses_apply() {
        let cli = Cli::try_parse_from([
            "treefilter",
            "--json-mode",
            "apply",
            "--tree",
            "raw.json",
            "--set",
            "2=false",
            "--set",
            "5=true",
            "--all",
            "true",
        ])
        .expect("parse");

        assert!(cli.json_mode);
        match cli.command {
            Commands::Apply { toggles, all, .. } => {
                assert_eq!(toggles, vec![(CategoryId(2), false), (CategoryId(5), true)]);
                assert_eq!(all, Some(true));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["treefilter"]).is_err());
    }
}
