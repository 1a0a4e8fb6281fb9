//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::Config;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use treefilter_core::{CategoryId, FilterError, FilterSession, RawTree, StateMerger, TreeState};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a tree or state file (16 MB).
const MAX_INPUT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FilterError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FilterError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FilterError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path, requiring an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, FilterError> {
    let canonical = path.canonicalize().map_err(|e| {
        FilterError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FilterError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path, requiring its parent directory to exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, FilterError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        FilterError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(FilterError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| FilterError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read and decode a JSON file after path and size checks.
fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, FilterError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| FilterError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;

    serde_json::from_str(&contents).map_err(|e| {
        FilterError::Serialization(format!("Invalid JSON in '{}': {}", path.display(), e))
    })
}

/// Load a raw category tree (bare list or `{"tree": [...]}`).
pub fn load_raw_tree(path: &Path) -> Result<RawTree, FilterError> {
    read_json_file(path)
}

/// Load a selection state saved by `apply --output`.
pub fn load_state(path: &Path) -> Result<TreeState, FilterError> {
    read_json_file(path)
}

/// Write a selection state as pretty JSON.
pub fn save_state(path: &Path, state: &TreeState) -> Result<(), FilterError> {
    let path = validate_output_path(path)?;
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| FilterError::Serialization(e.to_string()))?;

    std::fs::write(&path, json)
        .map_err(|e| FilterError::Io(format!("Cannot write '{}': {}", path.display(), e)))
}

fn print_json(value: &serde_json::Value) -> Result<(), FilterError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| FilterError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn join_ids(ids: &[CategoryId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server, optionally preloading a category tree.
pub async fn cmd_serve(config: &Config, tree: Option<&Path>) -> Result<(), FilterError> {
    let mut session = FilterSession::new();
    if let Some(path) = tree {
        let raw = load_raw_tree(path)?;
        session.merge(raw.nodes())?;
        tracing::info!(
            categories = session.category_count(),
            "Preloaded category tree from {}",
            path.display()
        );
    }

    println!("treefilter server starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.bind_address());
    println!(
        "  Auth:     {}",
        if config.server.api_key.is_some() {
            "api key"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health                          - Health check");
    println!("  GET  /session                         - Session summary");
    println!("  POST /selection                       - Selected item and category");
    println!("  POST /clear                           - Clear every filter");
    println!("  GET  /tree, POST /tree                - Read or merge the category tree");
    println!("  POST /toggle                          - Check or uncheck a category");
    println!("  GET  /checked                         - Checked category ids");
    println!("  GET  /categories/{{id}}                 - One category");
    println!("  GET  /categories/{{id}}/indeterminate   - Indeterminate flag");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.server, session).await
}

// =============================================================================
// APPLY COMMAND
// =============================================================================

/// Everything `apply` needs, decoupled from clap.
#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    pub tree: PathBuf,
    pub state: Option<PathBuf>,
    pub toggles: Vec<(CategoryId, bool)>,
    pub all: Option<bool>,
    pub root: Option<CategoryId>,
    pub output: Option<PathBuf>,
}

/// Result of an `apply` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Total categories in the merged tree.
    pub category_count: usize,
    /// Checked ids in pre-order, limited to `root` when given.
    pub checked: Vec<CategoryId>,
    /// Toggled ids that were not in the tree.
    pub missed: Vec<CategoryId>,
}

/// Merge, toggle and optionally save, without printing.
pub fn run_apply(request: &ApplyRequest) -> Result<ApplyOutcome, FilterError> {
    let raw = load_raw_tree(&request.tree)?;

    let mut session = match &request.state {
        Some(path) => FilterSession::with_tree(load_state(path)?),
        None => FilterSession::new(),
    };
    session.merge(raw.nodes())?;

    if let Some(value) = request.all {
        session.set_all(value);
    }

    let mut missed = Vec::new();
    for &(id, value) in &request.toggles {
        if !session.set_checked(id, value) {
            tracing::warn!(category = %id, "Toggle ignored: category not in tree");
            missed.push(id);
        }
    }

    if let Some(path) = &request.output {
        save_state(path, session.tree_state())?;
        tracing::info!("Selection state written to {}", path.display());
    }

    Ok(ApplyOutcome {
        category_count: session.category_count(),
        checked: session.checked_ids(request.root),
        missed,
    })
}

/// Merge a raw tree with a saved state, apply toggles and report.
pub fn cmd_apply(request: &ApplyRequest, json_mode: bool) -> Result<(), FilterError> {
    let outcome = run_apply(request)?;

    if json_mode {
        let checked: Vec<u64> = outcome.checked.iter().map(|id| id.0).collect();
        let missed: Vec<u64> = outcome.missed.iter().map(|id| id.0).collect();
        return print_json(&serde_json::json!({
            "categories": outcome.category_count,
            "root": request.root.map(|id| id.0),
            "checked_ids": checked,
            "missed": missed,
        }));
    }

    println!("Categories: {}", outcome.category_count);
    if let Some(root) = request.root {
        println!("Root:       {}", root);
    }
    println!(
        "Checked:    {} [{}]",
        outcome.checked.len(),
        join_ids(&outcome.checked)
    );
    if !outcome.missed.is_empty() {
        println!("Not found:  [{}]", join_ids(&outcome.missed));
    }
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Check a raw category tree without building any state.
pub fn cmd_validate(tree: &Path, json_mode: bool) -> Result<(), FilterError> {
    let raw = load_raw_tree(tree)?;
    let result = StateMerger::validate(raw.nodes());

    if json_mode {
        let output = match &result {
            Ok(()) => serde_json::json!({ "valid": true }),
            Err(e) => serde_json::json!({ "valid": false, "error": e.to_string() }),
        };
        print_json(&output)?;
    } else if result.is_ok() {
        println!("Category tree is valid: {}", tree.display());
    }

    result
}

// =============================================================================
// TESTS
// =============================================================================
