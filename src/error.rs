//! Error types for config-migrator.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Only fatal conditions are errors; merge conflicts are recorded in the
//! conflict log instead.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// An input file is missing, is not a file, or cannot be read.
    #[error("{0}")]
    Input(String),

    /// An input file could not be parsed as YAML or JSON.
    #[error("failed to parse {0}")]
    Parse(String),

    /// A path string does not follow the `a.b[2].c` syntax.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The rename map contains cycles or malformed paths.
    ///
    /// All problems are collected so the user can fix the map in one pass.
    #[error("invalid rename map:\n  - {}", .0.join("\n  - "))]
    InvalidRenameMap(Vec<String>),

    /// Tree surgery was asked to descend through a scalar or out-of-range index.
    #[error("cannot update '{path}': {reason}")]
    Tree { path: String, reason: String },

    /// The settings file is unreadable or contains invalid values.
    #[error("settings: {0}")]
    Config(String),

    /// An output file could not be written.
    #[error("failed to write output: {0}")]
    Output(String),
}

impl MigrateError {
    /// Returns the process exit code for this error.
    ///
    /// Every error is fatal to the run, so they all share one code.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Input(_)
            | MigrateError::Parse(_)
            | MigrateError::InvalidPath { .. }
            | MigrateError::InvalidRenameMap(_)
            | MigrateError::Tree { .. }
            | MigrateError::Config(_)
            | MigrateError::Output(_) => exit_codes::FAILURE,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        MigrateError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn tree(path: impl ToString, reason: impl Into<String>) -> Self {
        MigrateError::Tree {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_is_fatal() {
        let errors = [
            MigrateError::Input("golden config file not found: a.yaml".to_string()),
            MigrateError::Parse("template.yaml: bad indent".to_string()),
            MigrateError::invalid_path("a..b", "empty segment"),
            MigrateError::InvalidRenameMap(vec!["cycle".to_string()]),
            MigrateError::tree("a.b", "not a mapping"),
            MigrateError::Config("bad".to_string()),
            MigrateError::Output("disk full".to_string()),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), exit_codes::FAILURE);
        }
    }

    #[test]
    fn rename_map_errors_list_every_problem() {
        let err = MigrateError::InvalidRenameMap(vec![
            "Circular migration detected: a -> b -> a".to_string(),
            "Invalid path format: '.x'".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid rename map:\n  - Circular migration detected: a -> b -> a\n  - Invalid path format: '.x'"
        );
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = MigrateError::invalid_path("a..b", "empty segment");
        assert_eq!(err.to_string(), "invalid path 'a..b': empty segment");

        let err = MigrateError::tree("a.b", "'a' is not a mapping");
        assert_eq!(err.to_string(), "cannot update 'a.b': 'a' is not a mapping");
    }
}
