//! Duplicate-value detection and application.

use super::types::{AppliedTransformations, Confidence, Recommendation, TransformationRecord};
use crate::config::TransformSettings;
use crate::tree::{self, ConfigTree, TreePath};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

const REASON_MOVE: &str = "new path exists in reference template, old path does not";
const REASON_BOTH_PRESENT: &str = "both paths exist in reference template";
const REASON_NONE_PRESENT: &str = "neither path exists in reference template - manual review needed";

/// Finds values the merge left at two live paths and proposes which to keep.
#[derive(Debug, Clone, Default)]
pub struct TransformDetector {
    settings: TransformSettings,
}

/// Fields grouped by field name and value, in order of first appearance.
///
/// A sequence is indexed whole under its field name, so two lists only
/// group when every item matches.
#[derive(Default)]
struct ValueIndex {
    slots: HashMap<(String, String), usize>,
    groups: Vec<(Value, Vec<TreePath>)>,
}

impl ValueIndex {
    fn build(tree: &ConfigTree) -> Self {
        let mut index = Self::default();
        for (path, value) in tree::fields(tree) {
            if is_blank(value) {
                continue;
            }
            let Some(field) = path.field_name() else {
                continue;
            };
            let key = (field.to_string(), value.to_string());
            let slot = *index.slots.entry(key).or_insert_with(|| {
                index.groups.push((value.clone(), Vec::new()));
                index.groups.len() - 1
            });
            index.groups[slot].1.push(path);
        }
        index
    }

    fn duplicates(self) -> impl Iterator<Item = (Value, Vec<TreePath>)> {
        self.groups.into_iter().filter(|(_, paths)| paths.len() >= 2)
    }
}

impl TransformDetector {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }

    /// Records for every value shared by two or more fields of `merged`,
    /// judged against `reference`.
    ///
    /// Fields are grouped by their field name as well as their value, so a
    /// `replicas: 3` and a `retries: 3` are never confused.
    pub fn detect(&self, merged: &ConfigTree, reference: &ConfigTree) -> Vec<TransformationRecord> {
        let mut records = Vec::new();
        for (value, paths) in ValueIndex::build(merged).duplicates() {
            records.extend(judge_group(value, paths, reference));
        }

        let objects = self.fold_objects(&records, merged, reference);
        if !objects.is_empty() {
            records.retain(|r| !objects.iter().any(|o| r.old_path.is_descendant_of(&o.old_path)));
        }
        records.extend(objects);

        info!(records = records.len(), "transformation detection complete");
        records
    }

    /// Whole-object moves for parents most of whose fields are moving away.
    fn fold_objects(
        &self,
        records: &[TransformationRecord],
        merged: &ConfigTree,
        reference: &ConfigTree,
    ) -> Vec<TransformationRecord> {
        let mut by_parent: BTreeMap<TreePath, Vec<&TransformationRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.recommendation == Recommendation::Move) {
            if let Some(parent) = record.old_path.parent()
                && !parent.is_root()
            {
                by_parent.entry(parent).or_default().push(record);
            }
        }

        let mut objects = Vec::new();
        for (parent, moves) in by_parent {
            let Some(object @ Value::Object(_)) = tree::get(merged, &parent) else {
                continue;
            };
            let total = tree::count_fields(object);
            if total == 0 || total < self.settings.min_object_fields {
                continue;
            }
            let moved = moves.len();
            if (moved as f64) / (total as f64) < self.settings.object_move_ratio {
                continue;
            }
            if tree::exists(reference, &parent) {
                continue;
            }

            let new_path = moves[0]
                .new_path
                .parent()
                .unwrap_or_else(|| moves[0].new_path.clone());
            debug!(parent = %parent, moved, total, "folding field moves into object move");
            objects.push(TransformationRecord {
                old_path: parent,
                new_path,
                value: Value::String(format!("[object with {} fields]", total)),
                recommendation: Recommendation::Move,
                reason: format!(
                    "{}/{} child fields moved, parent not in reference template",
                    moved, total
                ),
                confidence: Confidence::High,
                object_fields: Some(total),
            });
        }
        objects
    }

    /// Apply Move and RemoveOld records to a copy of `merged`.
    ///
    /// Shallow records go first, so a field whose parent object was already
    /// removed is skipped rather than resurrected. Records whose old path
    /// runs through a sequence index, or whose old value has changed since
    /// detection, are skipped.
    pub fn apply(&self, merged: &ConfigTree, records: &[TransformationRecord]) -> AppliedTransformations {
        let mut tree = merged.clone();
        let mut applied = Vec::new();
        let mut deferred = Vec::new();
        let mut skipped = Vec::new();

        let mut ordered: Vec<&TransformationRecord> = records
            .iter()
            .filter(|r| r.recommendation != Recommendation::KeepBoth)
            .collect();
        ordered.sort_by(|a, b| {
            (a.old_path.depth(), &a.old_path).cmp(&(b.old_path.depth(), &b.old_path))
        });

        for record in ordered {
            if record.old_path.has_index() {
                warn!(path = %record.old_path, "refusing to remove a sequence item");
                skipped.push(record.old_path.clone());
                continue;
            }
            let Some(current) = tree::get(&tree, &record.old_path) else {
                debug!(path = %record.old_path, "old path already gone");
                skipped.push(record.old_path.clone());
                continue;
            };

            if !record.is_object_move() {
                if !tree::deep_equal(current, &record.value) {
                    debug!(path = %record.old_path, "value changed since detection");
                    skipped.push(record.old_path.clone());
                    continue;
                }
                if record.recommendation == Recommendation::Move
                    && let Err(e) = tree::set(&mut tree, &record.new_path, record.value.clone())
                {
                    warn!(
                        old = %record.old_path,
                        new = %record.new_path,
                        error = %e,
                        "cannot move value"
                    );
                    skipped.push(record.old_path.clone());
                    continue;
                }
            }

            tree::remove_and_prune(&mut tree, &record.old_path);
            if record.is_object_move() {
                deferred.push(record.old_path.clone());
            }
            applied.push(record.old_path.clone());
        }

        info!(
            applied = applied.len(),
            deferred = deferred.len(),
            skipped = skipped.len(),
            "transformations applied"
        );
        AppliedTransformations {
            tree,
            applied,
            deferred,
            skipped,
        }
    }
}

/// Values that carry no setting of their own.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Records for one group of paths sharing a field name and value.
fn judge_group(value: Value, paths: Vec<TreePath>, reference: &ConfigTree) -> Vec<TransformationRecord> {
    let (present, absent): (Vec<&TreePath>, Vec<&TreePath>) =
        paths.iter().partition(|path| tree::exists(reference, path));

    if let [new_path] = present.as_slice() {
        return absent
            .into_iter()
            .map(|old_path| TransformationRecord {
                old_path: old_path.clone(),
                new_path: (*new_path).clone(),
                value: value.clone(),
                recommendation: Recommendation::Move,
                reason: REASON_MOVE.to_string(),
                confidence: Confidence::High,
                object_fields: None,
            })
            .collect();
    }

    let (reason, confidence) = if present.is_empty() {
        (REASON_NONE_PRESENT, Confidence::Low)
    } else {
        (REASON_BOTH_PRESENT, Confidence::Medium)
    };
    let mut sorted = paths.clone();
    sorted.sort();
    sorted
        .windows(2)
        .map(|pair| TransformationRecord {
            old_path: pair[0].clone(),
            new_path: pair[1].clone(),
            value: value.clone(),
            recommendation: Recommendation::KeepBoth,
            reason: reason.to_string(),
            confidence,
            object_fields: None,
        })
        .collect()
}
