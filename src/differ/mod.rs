//! Tree differ.
//!
//! Compares configuration trees: which customizations a golden config
//! carries on top of its template, and how two template versions differ in
//! shape. Every function here is pure.

use crate::tree::{self, ConfigTree, TreePath, ValueKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[cfg(test)]
mod tests;

/// A customization: a value in the golden config that differs from, or is
/// absent in, the template it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaEntry {
    pub path: TreePath,
    pub value: Value,
}

/// Extract every customization `golden` carries relative to `template`.
///
/// Keys absent from the template are captured with their whole subtree and
/// not descended into. Mappings present on both sides are compared key by
/// key; anything else (scalars, sequences, type changes) is captured when
/// the two values differ. Entries come out in golden document order.
pub fn extract_custom_data(golden: &ConfigTree, template: &ConfigTree) -> Vec<DeltaEntry> {
    let mut deltas = Vec::new();
    extract_recursive(golden, template, &TreePath::root(), &mut deltas);
    deltas
}

fn extract_recursive(
    golden: &Value,
    template: &Value,
    prefix: &TreePath,
    out: &mut Vec<DeltaEntry>,
) {
    let (Value::Object(golden), Value::Object(template)) = (golden, template) else {
        return;
    };

    for (key, golden_value) in golden {
        let path = prefix.key(key.as_str());
        match template.get(key) {
            None => out.push(DeltaEntry {
                path,
                value: golden_value.clone(),
            }),
            Some(template_value @ Value::Object(_)) if golden_value.is_object() => {
                extract_recursive(golden_value, template_value, &path, out);
            }
            Some(template_value) => {
                if !tree::deep_equal(golden_value, template_value) {
                    out.push(DeltaEntry {
                        path,
                        value: golden_value.clone(),
                    });
                }
            }
        }
    }
}

/// Paths present in `old` but not in `new`.
pub fn find_deleted_paths(old: &ConfigTree, new: &ConfigTree) -> BTreeSet<TreePath> {
    let new_paths = tree::all_paths(new);
    tree::all_paths(old)
        .into_iter()
        .filter(|path| !new_paths.contains(path))
        .collect()
}

/// Paths present in `new` but not in `old`.
pub fn find_added_paths(old: &ConfigTree, new: &ConfigTree) -> BTreeSet<TreePath> {
    find_deleted_paths(new, old)
}

/// Paths present in both versions whose shape changed.
///
/// A shape change is a different runtime kind, or two mappings with
/// different key sets. The value is a human-readable description.
pub fn find_structural_changes(old: &ConfigTree, new: &ConfigTree) -> BTreeMap<TreePath, String> {
    let new_paths = tree::all_paths(new);
    let mut changes = BTreeMap::new();

    for path in tree::all_paths(old).intersection(&new_paths) {
        let (Some(old_value), Some(new_value)) = (tree::get(old, path), tree::get(new, path))
        else {
            continue;
        };
        if let Some(description) = describe_shape_change(old_value, new_value) {
            changes.insert(path.clone(), description);
        }
    }

    changes
}

fn describe_shape_change(old: &Value, new: &Value) -> Option<String> {
    let (old_kind, new_kind) = (ValueKind::of(old), ValueKind::of(new));
    if old_kind != new_kind {
        return Some(format!("Type changed from {} to {}", old_kind, new_kind));
    }

    let (Value::Object(old), Value::Object(new)) = (old, new) else {
        return None;
    };
    let removed: Vec<&str> = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .map(String::as_str)
        .collect();
    let added: Vec<&str> = new
        .keys()
        .filter(|k| !old.contains_key(*k))
        .map(String::as_str)
        .collect();
    if removed.is_empty() && added.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if !removed.is_empty() {
        parts.push(format!("removed keys: {}", bracketed(removed)));
    }
    if !added.is_empty() {
        parts.push(format!("added keys: {}", bracketed(added)));
    }
    Some(format!("Structure changed - {}", parts.join(", ")))
}

fn bracketed(mut keys: Vec<&str>) -> String {
    keys.sort_unstable();
    format!("[{}]", keys.join(", "))
}

/// Everything that changed between two template versions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateDiff {
    pub added: BTreeSet<TreePath>,
    pub deleted: BTreeSet<TreePath>,
    pub structural: BTreeMap<TreePath, String>,
}

impl TemplateDiff {
    pub fn between(old: &ConfigTree, new: &ConfigTree) -> Self {
        Self {
            added: find_added_paths(old, new),
            deleted: find_deleted_paths(old, new),
            structural: find_structural_changes(old, new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.structural.is_empty()
    }

    /// Total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.deleted.len() + self.structural.len()
    }
}

impl fmt::Display for TemplateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No differences found.")?;
            return Ok(());
        }

        writeln!(f, "Template changes: {}", self.change_count())?;
        writeln!(f, "{}", "=".repeat(60))?;

        if !self.deleted.is_empty() {
            writeln!(f, "  Deleted ({}):", self.deleted.len())?;
            for path in &self.deleted {
                writeln!(f, "    - {}", path)?;
            }
        }
        if !self.added.is_empty() {
            writeln!(f, "  Added ({}):", self.added.len())?;
            for path in &self.added {
                writeln!(f, "    + {}", path)?;
            }
        }
        if !self.structural.is_empty() {
            writeln!(f, "  Structural ({}):", self.structural.len())?;
            for (path, description) in &self.structural {
                writeln!(f, "    ~ {}: {}", path, description)?;
            }
        }
        Ok(())
    }
}
