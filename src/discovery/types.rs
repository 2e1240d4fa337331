//! Discovery results.

use crate::tree::TreePath;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A proposed new home for an orphaned customization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationCandidate {
    pub new_path: TreePath,
    /// Name of the signal that proposed this path.
    pub signal: &'static str,
    /// Similarity in [0, 1].
    pub score: f64,
    pub evidence: String,
    pub requires_review: bool,
    /// Key renames to apply when the moved value is a mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_mapping: Option<BTreeMap<String, String>>,
}

/// How an orphan's path relates to its best candidate's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationType {
    /// The new path has more segments.
    PathExpansion,
    /// The new path has fewer segments.
    PathConsolidation,
    /// Same depth, different final segment.
    FieldRename,
    /// Same depth and final segment, different ancestors.
    StructuralRelocation,
    /// Identical paths.
    DirectMapping,
}

impl MigrationType {
    pub fn classify(old: &TreePath, new: &TreePath) -> Self {
        if old.depth() != new.depth() {
            return if new.depth() > old.depth() {
                MigrationType::PathExpansion
            } else {
                MigrationType::PathConsolidation
            };
        }
        if old.last() != new.last() {
            return MigrationType::FieldRename;
        }
        if old != new {
            return MigrationType::StructuralRelocation;
        }
        MigrationType::DirectMapping
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MigrationType::PathExpansion => "path_expansion",
            MigrationType::PathConsolidation => "path_consolidation",
            MigrationType::FieldRename => "field_rename",
            MigrationType::StructuralRelocation => "structural_relocation",
            MigrationType::DirectMapping => "direct_mapping",
        }
    }
}

impl fmt::Display for MigrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence band a discovered migration falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryTier {
    /// Confident and unflagged: applied without asking.
    AutoApply,
    /// Plausible or flagged: suggested to a human.
    Review,
    /// Reported only, never applied by default.
    LowConfidence,
}

/// Everything discovery found for one orphan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredMigration {
    pub old_path: TreePath,
    pub custom_value: Value,
    /// All candidates, best first, one per target path.
    pub candidates: Vec<MigrationCandidate>,
    pub best_candidate: MigrationCandidate,
    /// Equal to the best candidate's score.
    pub confidence: f64,
    pub migration_type: MigrationType,
    pub tier: DiscoveryTier,
}

impl DiscoveredMigration {
    /// Candidates after the best one.
    pub fn alternatives(&self) -> &[MigrationCandidate] {
        self.candidates.get(1..).unwrap_or_default()
    }
}
