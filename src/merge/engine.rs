//! Conflict-resolution merge.
//!
//! Applies the customizations extracted from a golden config onto a copy of
//! the new template. Each customization resolves to exactly one outcome and
//! every outcome that is not a clean overwrite is logged.

use super::log::{ConflictAction, ConflictLogEntry};
use super::rename_map::RenameMap;
use crate::differ::{self, DeltaEntry};
use crate::tree::{self, ConfigTree, TreePath, ValueKind};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const REASON_REMOVED: &str = "was removed in new template version";
const REASON_MISSING: &str = "path no longer exists in new template";
const REASON_DEFAULT_REMOVED: &str = "template default removed in new template version";

/// Result of one merge pass.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The new template with customizations applied.
    pub tree: ConfigTree,
    /// Decisions in the order they were taken.
    pub log: Vec<ConflictLogEntry>,
    /// Customizations that found no home, keyed by their golden path.
    pub orphans: Vec<DeltaEntry>,
}

/// Merge engine bound to one pair of template versions.
///
/// The template comparison is computed once and reused across passes.
#[derive(Debug)]
pub struct MergeEngine<'a> {
    template_old: &'a ConfigTree,
    template_new: &'a ConfigTree,
    deleted: BTreeSet<TreePath>,
    structural: BTreeMap<TreePath, String>,
}

/// How one customization resolved against the new template.
enum Resolution {
    Written { reason: String, review: bool, default: Value },
    Unchanged,
    Mismatch { reason: String, default: Value },
    Missing { reason: String },
}

impl<'a> MergeEngine<'a> {
    pub fn new(template_old: &'a ConfigTree, template_new: &'a ConfigTree) -> Self {
        Self {
            template_old,
            template_new,
            deleted: differ::find_deleted_paths(template_old, template_new),
            structural: differ::find_structural_changes(template_old, template_new),
        }
    }

    pub fn template_new(&self) -> &ConfigTree {
        self.template_new
    }

    /// Paths removed between the two template versions.
    pub fn deleted_paths(&self) -> &BTreeSet<TreePath> {
        &self.deleted
    }

    pub fn structural_changes(&self) -> &BTreeMap<TreePath, String> {
        &self.structural
    }

    /// Extract customizations from `golden` and merge them.
    pub fn merge(&self, golden: &ConfigTree, renames: Option<&RenameMap>) -> MergeOutcome {
        let deltas = differ::extract_custom_data(golden, self.template_old);
        info!(deltas = deltas.len(), "extracted customizations");
        self.merge_deltas(&deltas, renames)
    }

    /// Merge already-extracted customizations onto a copy of the new template.
    pub fn merge_deltas(&self, deltas: &[DeltaEntry], renames: Option<&RenameMap>) -> MergeOutcome {
        let mut merged = self.template_new.clone();
        let mut log = Vec::new();
        let mut orphans = Vec::new();

        for delta in deltas {
            let target = renames.and_then(|map| map.target(&delta.path));
            let entry = match target {
                Some(target) => {
                    let value = match renames.and_then(|map| map.field_renames(&delta.path)) {
                        Some(fields) => rename_fields(&delta.value, fields),
                        None => delta.value.clone(),
                    };
                    self.apply_renamed(&mut merged, delta, target, value)
                }
                None => self.apply(&mut merged, delta),
            };

            if let Some(entry) = entry {
                debug!(path = %entry.path, action = %entry.action, "resolved customization");
                if entry.action == ConflictAction::Deleted {
                    orphans.push(delta.clone());
                }
                log.push(entry);
            }
        }

        self.log_removed_defaults(&mut log);

        info!(
            entries = log.len(),
            orphans = orphans.len(),
            "merge pass complete"
        );
        MergeOutcome {
            tree: merged,
            log,
            orphans,
        }
    }

    fn apply(&self, merged: &mut ConfigTree, delta: &DeltaEntry) -> Option<ConflictLogEntry> {
        let path = &delta.path;
        let entry = ConflictLogEntry::new(path.clone(), ConflictAction::Overwrite)
            .with_source(delta.value.clone());

        match self.resolve(merged, path, &delta.value) {
            Resolution::Unchanged => None,
            Resolution::Written {
                reason,
                review,
                default,
            } => {
                let entry = entry
                    .with_target(delta.value.clone())
                    .with_default(default)
                    .with_reason(reason);
                Some(if review { entry.needs_review() } else { entry })
            }
            Resolution::Mismatch { reason, default } => Some(ConflictLogEntry {
                action: ConflictAction::StructuralMismatch,
                ..entry
                    .with_target(default.clone())
                    .with_default(default)
                    .with_reason(reason)
                    .needs_review()
            }),
            Resolution::Missing { reason } => Some(ConflictLogEntry {
                action: ConflictAction::Deleted,
                ..entry.with_reason(reason).needs_review()
            }),
        }
    }

    /// Apply a customization whose path was renamed. The log entry stays on
    /// the original path so every removed path is accounted for.
    fn apply_renamed(
        &self,
        merged: &mut ConfigTree,
        delta: &DeltaEntry,
        target: &TreePath,
        value: Value,
    ) -> Option<ConflictLogEntry> {
        let entry = ConflictLogEntry::new(delta.path.clone(), ConflictAction::Migrated)
            .with_source(delta.value.clone())
            .needs_review();

        if let Some(default) = tree::get(self.template_new, target) {
            let (have, want) = (ValueKind::of(&value), ValueKind::of(default));
            let container = |kind| matches!(kind, ValueKind::Mapping | ValueKind::Sequence);
            if have != want && (container(have) || container(want)) {
                return Some(ConflictLogEntry {
                    action: ConflictAction::Deleted,
                    ..entry.with_reason(format!(
                        "Rename target '{}' unusable: holds a {} but the value is a {}",
                        target, want, have
                    ))
                });
            }
        }

        match self.resolve(merged, target, &value) {
            Resolution::Written { reason, default, .. } => Some(
                entry
                    .with_target(value)
                    .with_default(default)
                    .with_reason(format!("Migrated to '{}': {}", target, reason)),
            ),
            Resolution::Unchanged => {
                let default = tree::get(self.template_new, target)
                    .cloned()
                    .unwrap_or(Value::Null);
                Some(
                    entry
                        .with_target(value)
                        .with_default(default)
                        .with_reason(format!(
                            "Migrated to '{}': value matches new template default",
                            target
                        )),
                )
            }
            Resolution::Mismatch { reason, .. } | Resolution::Missing { reason } => {
                Some(ConflictLogEntry {
                    action: ConflictAction::Deleted,
                    ..entry.with_reason(format!(
                        "Rename target '{}' unusable: {}",
                        target, reason
                    ))
                })
            }
        }
    }

    /// Decide what happens to `value` at `path` and write it if allowed.
    fn resolve(&self, merged: &mut ConfigTree, path: &TreePath, value: &Value) -> Resolution {
        if self.deleted.contains(path) {
            return Resolution::Missing {
                reason: format!("Key '{}' {}", path, REASON_REMOVED),
            };
        }

        let Some(default) = tree::get(self.template_new, path).cloned() else {
            return Resolution::Missing {
                reason: REASON_MISSING.to_string(),
            };
        };

        if let Some(change) = self.structural.get(path) {
            if ValueKind::of(value) != ValueKind::of(&default) {
                return Resolution::Mismatch {
                    reason: format!("Cannot apply custom value due to type change: {}", change),
                    default,
                };
            }
            return match tree::set(merged, path, value.clone()) {
                Ok(()) => Resolution::Written {
                    reason: format!(
                        "Custom value applied despite structural change: {}",
                        change
                    ),
                    review: true,
                    default,
                },
                Err(e) => Resolution::Mismatch {
                    reason: format!("Failed to apply custom value: {}", e),
                    default,
                },
            };
        }

        if let Err(e) = tree::set(merged, path, value.clone()) {
            return Resolution::Mismatch {
                reason: format!("Failed to apply custom value: {}", e),
                default,
            };
        }
        if tree::deep_equal(value, &default) {
            return Resolution::Unchanged;
        }
        Resolution::Written {
            reason: "Custom value preserved from old configuration".to_string(),
            review: false,
            default,
        }
    }

    /// Log every removed template path that no customization accounted for.
    fn log_removed_defaults(&self, log: &mut Vec<ConflictLogEntry>) {
        let logged: BTreeSet<TreePath> = log.iter().map(|entry| entry.path.clone()).collect();
        for path in self.deleted.difference(&logged) {
            let default = tree::get(self.template_old, path)
                .cloned()
                .unwrap_or(Value::Null);
            log.push(
                ConflictLogEntry::new(path.clone(), ConflictAction::Deleted)
                    .with_source(default)
                    .with_reason(REASON_DEFAULT_REMOVED)
                    .needs_review(),
            );
        }
    }
}

/// Rename the top-level keys of a mapping value; other values pass through.
fn rename_fields(value: &Value, fields: &BTreeMap<String, String>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| {
                    let key = fields.get(key).cloned().unwrap_or_else(|| key.clone());
                    (key, child.clone())
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// One-shot merge: `merge(golden, template_old, template_new, renames)`.
pub fn merge(
    golden: &ConfigTree,
    template_old: &ConfigTree,
    template_new: &ConfigTree,
    renames: Option<&RenameMap>,
) -> MergeOutcome {
    MergeEngine::new(template_old, template_new).merge(golden, renames)
}
