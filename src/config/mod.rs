//! Settings model for config-migrator.
//!
//! This module defines the Settings struct read from the optional
//! `--settings` YAML file. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), defaults matching the calibrated discovery
//! heuristics, and validation of every threshold and weight.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Settings;
pub use types::{
    DiscoverySettings, RenameScope, SemanticWeights, StructuralWeights, SummarySettings,
    TransformSettings, ValueWeights,
};
