//! Structural-position similarity.

use super::{CandidateSignal, Orphan, SearchSpace, SignalError};
use crate::config::{DiscoverySettings, StructuralWeights};
use crate::discovery::similarity::jaccard_of;
use crate::discovery::types::MigrationCandidate;
use crate::tree::TreePath;

/// Scores how close two paths sit in the tree: shared leading segments,
/// similar depth, and overlapping segment names.
#[derive(Debug, Clone)]
pub struct StructuralSignal {
    threshold: f64,
    review_below: f64,
    weights: StructuralWeights,
}

impl StructuralSignal {
    pub const NAME: &'static str = "structural";

    pub fn new(settings: &DiscoverySettings) -> Self {
        Self {
            threshold: settings.structural_threshold,
            review_below: settings.structural_review_below,
            weights: settings.structural_weights,
        }
    }

    /// Weighted structural similarity of two paths, in [0, 1].
    pub fn score(&self, old: &TreePath, new: &TreePath) -> f64 {
        let max_depth = old.depth().max(new.depth());
        if max_depth == 0 {
            return 0.0;
        }
        let max_depth = max_depth as f64;

        let prefix = old.common_prefix_len(new) as f64 / max_depth;
        let depth = 1.0 - old.depth().abs_diff(new.depth()) as f64 / max_depth;
        let keywords = jaccard_of(old.segments(), new.segments());

        prefix * self.weights.prefix + depth * self.weights.depth + keywords * self.weights.keywords
    }
}

impl CandidateSignal for StructuralSignal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn candidates(
        &self,
        orphan: Orphan<'_>,
        space: &SearchSpace<'_>,
    ) -> Result<Vec<MigrationCandidate>, SignalError> {
        let mut out = Vec::new();
        for path in space.paths() {
            let score = self.score(orphan.path, path);
            if score <= self.threshold {
                continue;
            }
            let common: Vec<String> = orphan
                .path
                .common_prefix(path)
                .segments()
                .iter()
                .map(ToString::to_string)
                .collect();
            out.push(MigrationCandidate {
                new_path: path.clone(),
                signal: Self::NAME,
                score,
                evidence: format!(
                    "Structural similarity: {:.2}, Common: {}",
                    score,
                    common.join("/")
                ),
                requires_review: score < self.review_below,
                field_mapping: None,
            });
        }
        Ok(out)
    }
}
