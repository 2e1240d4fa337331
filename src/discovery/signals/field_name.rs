//! Field-name similarity.

use super::{CandidateSignal, Orphan, SearchSpace, SignalError};
use crate::config::DiscoverySettings;
use crate::discovery::similarity::sequence_ratio;
use crate::discovery::types::MigrationCandidate;
use crate::tree::TreePath;
use std::collections::BTreeMap;

/// Compares the orphan's final key with every candidate's final key.
///
/// The orphan's key is also compared qualified by its parent key, so that
/// `serviceAccount.name` is recognised in a field called
/// `serviceAccountName`.
#[derive(Debug, Clone)]
pub struct FieldNameSignal {
    threshold: f64,
    review_below: f64,
}

impl FieldNameSignal {
    pub const NAME: &'static str = "field_name";

    pub fn new(settings: &DiscoverySettings) -> Self {
        Self {
            threshold: settings.field_name_threshold,
            review_below: settings.field_name_review_below,
        }
    }
}

/// `parent.final` collapsed into one lowercase word.
fn qualified_name(path: &TreePath) -> Option<String> {
    let mut keys = path.keys().rev();
    let last = keys.next()?;
    let parent = keys.next()?;
    Some(format!("{}{}", parent, last).to_lowercase())
}

impl CandidateSignal for FieldNameSignal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn candidates(
        &self,
        orphan: Orphan<'_>,
        space: &SearchSpace<'_>,
    ) -> Result<Vec<MigrationCandidate>, SignalError> {
        let Some(old_name) = orphan.path.field_name() else {
            return Ok(Vec::new());
        };
        let qualified = qualified_name(orphan.path);

        let mut out = Vec::new();
        for path in space.paths() {
            let Some(new_name) = path.field_name() else {
                continue;
            };

            let direct = sequence_ratio(old_name, new_name);
            let via_parent = qualified
                .as_deref()
                .map(|q| sequence_ratio(q, &new_name.to_lowercase()))
                .unwrap_or(0.0);
            let (ratio, shown) = if via_parent > direct {
                (via_parent, orphan.path.to_string())
            } else {
                (direct, old_name.to_string())
            };
            if ratio <= self.threshold {
                continue;
            }

            let field_mapping = (old_name != new_name)
                .then(|| BTreeMap::from([(old_name.to_string(), new_name.to_string())]));
            out.push(MigrationCandidate {
                new_path: path.clone(),
                signal: Self::NAME,
                score: ratio,
                evidence: format!("Field name: '{}' -> '{}' ({:.2})", shown, new_name, ratio),
                requires_review: ratio < self.review_below,
                field_mapping,
            });
        }
        Ok(out)
    }
}
