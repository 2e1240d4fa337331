//! Loading and writing configuration trees.
//!
//! Trees are read from YAML (the default) or JSON, chosen by file
//! extension, and validated before any merge starts. Outputs are written
//! atomically.

mod atomic;


pub use atomic::{atomic_write, atomic_write_file};

use crate::error::{MigrateError, Result};
use crate::tree::{self, ConfigTree, ValueKind};
use std::fs;
use std::path::Path;

/// Nesting depth above which an output tree draws a warning.
pub const MAX_RECOMMENDED_DEPTH: usize = 20;

/// Serialization format of a tree file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Yaml,
    Json,
}

impl TreeFormat {
    /// JSON for `.json` files, YAML for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TreeFormat::Json,
            _ => TreeFormat::Yaml,
        }
    }
}

/// Load and validate a configuration tree.
///
/// `role` names the input in error messages ("golden config", "new
/// template"). The file must exist, parse, and have a mapping at its root.
pub fn load_tree(path: &Path, role: &str) -> Result<ConfigTree> {
    if !path.exists() {
        return Err(MigrateError::Input(format!(
            "{} file not found: {}",
            role,
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(MigrateError::Input(format!(
            "{} path is not a file: {}",
            role,
            path.display()
        )));
    }
    let content = fs::read_to_string(path).map_err(|e| {
        MigrateError::Input(format!("cannot read {} '{}': {}", role, path.display(), e))
    })?;

    parse_tree(&content, TreeFormat::from_path(path))
        .map_err(|reason| MigrateError::Parse(format!("{} '{}': {}", role, path.display(), reason)))
}

/// Parse tree text, requiring a mapping at the root.
pub fn parse_tree(content: &str, format: TreeFormat) -> std::result::Result<ConfigTree, String> {
    let tree: ConfigTree = match format {
        TreeFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        TreeFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
    };
    match ValueKind::of(&tree) {
        ValueKind::Mapping => Ok(tree),
        other => Err(format!("root must be a mapping, found {}", other)),
    }
}

/// Render a tree in `format`.
pub fn render_tree(tree: &ConfigTree, format: TreeFormat) -> Result<String> {
    match format {
        TreeFormat::Yaml => serde_yaml::to_string(tree)
            .map_err(|e| MigrateError::Output(format!("cannot render YAML: {}", e))),
        TreeFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| MigrateError::Output(format!("cannot render JSON: {}", e))),
    }
}

/// Write a tree atomically, in the format implied by the file extension.
pub fn write_tree(path: &Path, tree: &ConfigTree) -> Result<()> {
    let rendered = render_tree(tree, TreeFormat::from_path(path))?;
    atomic_write_file(path, &rendered)
}

/// Non-fatal problems with a merged tree.
pub fn output_warnings(tree: &ConfigTree) -> Vec<String> {
    let mut warnings = Vec::new();
    if tree.as_object().is_some_and(|map| map.is_empty()) {
        warnings.push("merged configuration is empty".to_string());
    }
    let depth = tree::max_depth(tree);
    if depth > MAX_RECOMMENDED_DEPTH {
        warnings.push(format!(
            "merged configuration nesting too deep ({} levels, maximum recommended {})",
            depth, MAX_RECOMMENDED_DEPTH
        ));
    }
    warnings
}
