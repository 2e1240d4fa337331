//! Settings types and defaults for config-migrator.
//!
//! This module defines the nested settings sections, enums, and default
//! value functions used by the `Settings` struct.

use crate::discovery::DiscoveryTier;
use serde::{Deserialize, Serialize};

/// Which discovered renames are fed back into the second merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenameScope {
    /// Only migrations that qualify for automatic application (default, safest).
    #[default]
    AutoApplyOnly,
    /// Auto-apply migrations plus those suggested for review.
    IncludeReview,
    /// Every discovered migration, including low-confidence ones.
    All,
}

impl RenameScope {
    /// Parse a rename scope from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "auto_apply_only" => Some(Self::AutoApplyOnly),
            "include_review" => Some(Self::IncludeReview),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Whether migrations in `tier` are fed back into the merge.
    pub fn admits(self, tier: DiscoveryTier) -> bool {
        match self {
            Self::AutoApplyOnly => tier == DiscoveryTier::AutoApply,
            Self::IncludeReview => tier != DiscoveryTier::LowConfidence,
            Self::All => true,
        }
    }
}

/// Weights for the structural-position signal. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralWeights {
    /// Shared leading segments as a fraction of the longer path.
    pub prefix: f64,
    /// Similarity of path depths.
    pub depth: f64,
    /// Jaccard overlap of the segment sets.
    pub keywords: f64,
}

impl Default for StructuralWeights {
    fn default() -> Self {
        Self {
            prefix: 0.4,
            depth: 0.3,
            keywords: 0.3,
        }
    }
}

/// Weights for string values in the value-pattern signal. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueWeights {
    pub pattern: f64,
    pub length: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self {
            pattern: 0.7,
            length: 0.3,
        }
    }
}

/// Weights for the semantic-domain signal. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticWeights {
    /// Awarded for a domain match alone.
    pub base: f64,
    /// Scaled by domain keyword overlap.
    pub keywords: f64,
    /// Scaled by shared ancestor keys.
    pub context: f64,
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            base: 0.6,
            keywords: 0.3,
            context: 0.1,
        }
    }
}

/// Candidate discovery calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Confidence at or above which an unflagged migration is auto-applied.
    pub auto_apply_threshold: f64,
    /// Confidence at or above which a migration is suggested for review.
    pub suggest_threshold: f64,
    /// Lower bounds of the medium and low bands in review guidance. The
    /// high band starts at `auto_apply_threshold`.
    pub medium_confidence_threshold: f64,
    pub low_confidence_threshold: f64,

    pub field_name_threshold: f64,
    pub field_name_review_below: f64,
    pub value_pattern_threshold: f64,
    pub value_pattern_review_below: f64,
    pub structural_threshold: f64,
    pub structural_review_below: f64,
    pub semantic_review_below: f64,

    pub structural_weights: StructuralWeights,
    pub value_weights: ValueWeights,
    pub semantic_weights: SemanticWeights,

    /// Which discovered renames the second merge pass receives.
    pub rename_scope: RenameScope,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            auto_apply_threshold: 0.8,
            suggest_threshold: 0.5,
            medium_confidence_threshold: 0.6,
            low_confidence_threshold: 0.4,
            field_name_threshold: 0.6,
            field_name_review_below: 0.8,
            value_pattern_threshold: 0.5,
            value_pattern_review_below: 0.7,
            structural_threshold: 0.4,
            structural_review_below: 0.7,
            semantic_review_below: 0.8,
            structural_weights: StructuralWeights::default(),
            value_weights: ValueWeights::default(),
            semantic_weights: SemanticWeights::default(),
            rename_scope: RenameScope::default(),
        }
    }
}

/// Transformation detector calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Share of a parent's fields that must move before the whole
    /// parent is reported as one object move.
    pub object_move_ratio: f64,
    /// Smallest number of fields a parent needs to be folded.
    pub min_object_fields: usize,
    /// Whether the migrate command applies field-level Move records.
    pub apply_moves: bool,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            object_move_ratio: 0.5,
            min_object_fields: default_min_object_fields(),
            apply_moves: default_true(),
        }
    }
}

/// Run summary presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// How many manual-review paths the console summary lists.
    pub critical_paths_shown: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            critical_paths_shown: default_critical_paths_shown(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_min_object_fields() -> usize {
    2
}
pub(crate) fn default_critical_paths_shown() -> usize {
    5
}
pub(crate) fn default_true() -> bool {
    true
}
