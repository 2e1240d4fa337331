//! Candidate signals.
//!
//! Each signal independently scans the new template for paths that could be
//! the new home of an orphaned customization and scores them in [0, 1].
//! Signals fail per orphan: an error from one signal costs that orphan the
//! signal's candidates and nothing else.

mod field_name;
mod semantic;
mod structural;
mod value_pattern;

pub use field_name::FieldNameSignal;
pub use semantic::SemanticSignal;
pub use structural::StructuralSignal;
pub use value_pattern::ValuePatternSignal;

use super::types::MigrationCandidate;
use crate::config::DiscoverySettings;
use crate::tree::{self, ConfigTree, TreePath};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Why a signal could not score an orphan.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("path '{0}' does not resolve in the new template")]
    Unresolved(TreePath),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// The customization being rehomed.
#[derive(Debug, Clone, Copy)]
pub struct Orphan<'a> {
    pub path: &'a TreePath,
    pub value: &'a Value,
}

/// The new template together with every path a candidate may name.
///
/// Built once per discovery run and shared by every signal and orphan.
#[derive(Debug)]
pub struct SearchSpace<'a> {
    tree: &'a ConfigTree,
    paths: Vec<TreePath>,
}

impl<'a> SearchSpace<'a> {
    pub fn new(tree: &'a ConfigTree) -> Self {
        Self {
            tree,
            paths: tree::searchable_paths(tree),
        }
    }

    pub fn paths(&self) -> &[TreePath] {
        &self.paths
    }

    /// The template value at `path`.
    pub fn value(&self, path: &TreePath) -> Result<&'a Value, SignalError> {
        tree::get(self.tree, path).ok_or_else(|| SignalError::Unresolved(path.clone()))
    }
}

/// A similarity heuristic that proposes candidate paths.
pub trait CandidateSignal {
    /// Short identifier recorded on every candidate this signal emits.
    fn name(&self) -> &'static str;

    /// Score the search space against one orphan.
    fn candidates(
        &self,
        orphan: Orphan<'_>,
        space: &SearchSpace<'_>,
    ) -> Result<Vec<MigrationCandidate>, SignalError>;
}

/// The four standard signals, calibrated by `settings`.
///
/// A signal that cannot be built is left out with a warning.
pub fn default_signals(settings: &DiscoverySettings) -> Vec<Box<dyn CandidateSignal>> {
    let mut signals: Vec<Box<dyn CandidateSignal>> = vec![
        Box::new(FieldNameSignal::new(settings)),
        Box::new(StructuralSignal::new(settings)),
    ];

    match ValuePatternSignal::new(settings) {
        Ok(signal) => signals.insert(1, Box::new(signal)),
        Err(e) => warn!(error = %e, "value pattern signal unavailable"),
    }
    match SemanticSignal::new(settings) {
        Ok(signal) => signals.push(Box::new(signal)),
        Err(e) => warn!(error = %e, "semantic signal unavailable"),
    }

    signals
}
