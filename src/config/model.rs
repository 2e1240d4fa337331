//! Settings struct definition.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Tool settings for config-migrator.
///
/// Loaded from the YAML file given with `--settings`; every field is
/// optional and unknown fields are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // =========================================================================
    // Candidate discovery
    // =========================================================================
    /// Signal thresholds, weights and auto-apply gates.
    pub discovery: DiscoverySettings,

    // =========================================================================
    // Transformation detection
    // =========================================================================
    pub transform: TransformSettings,

    // =========================================================================
    // Run summary
    // =========================================================================
    pub summary: SummarySettings,
}
