//! # treefilter
//!
//! Server and CLI around the treefilter-core selection engine.
//!
//! - `api`: axum HTTP server hosting one filter session
//! - `cli`: clap commands over tree and state files
//! - `config`: layered settings (defaults, TOML file, environment, flags)

pub mod api;
pub mod cli;
pub mod config;
