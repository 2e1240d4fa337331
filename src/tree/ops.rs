//! Get/set/delete and enumeration over `serde_json::Value` trees.
//!
//! None of these functions clone or mutate their input unless handed a
//! `&mut Value`; callers that must keep an input intact work on a clone.

use super::path::{Segment, TreePath};
use crate::error::{MigrateError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Look up the value at `path`.
pub fn get<'a>(tree: &'a Value, path: &TreePath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| match (node, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key),
            (Value::Array(items), Segment::Index(idx)) => items.get(*idx),
            _ => None,
        })
}

fn get_mut<'a>(tree: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(tree, |node, segment| match (node, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
            (Value::Array(items), Segment::Index(idx)) => items.get_mut(*idx),
            _ => None,
        })
}

pub fn exists(tree: &Value, path: &TreePath) -> bool {
    get(tree, path).is_some()
}

/// Write `value` at `path`, creating missing intermediate mappings.
///
/// Sequence indices must already exist; descending through a scalar is an
/// error. Writing the root path replaces the whole tree.
pub fn set(tree: &mut Value, path: &TreePath, value: Value) -> Result<()> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        *tree = value;
        return Ok(());
    };

    let mut node = tree;
    for (depth, segment) in parents.iter().enumerate() {
        node = match (node, segment) {
            (Value::Object(map), Segment::Key(key)) => map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            (Value::Array(items), Segment::Index(idx)) => {
                let len = items.len();
                items.get_mut(*idx).ok_or_else(|| {
                    MigrateError::tree(path, format!("index {} out of range (length {})", idx, len))
                })?
            }
            (other, segment) => {
                return Err(unreachable_segment(path, &segments[..depth], other, segment));
            }
        };
    }

    match (node, last) {
        (Value::Object(map), Segment::Key(key)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Value::Array(items), Segment::Index(idx)) => match items.get_mut(*idx) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MigrateError::tree(path, format!("index {} out of range", idx))),
        },
        (other, segment) => Err(unreachable_segment(path, parents, other, segment)),
    }
}

fn unreachable_segment(
    path: &TreePath,
    at: &[Segment],
    node: &Value,
    segment: &Segment,
) -> MigrateError {
    let at = TreePath::from_segments(at.to_vec());
    let reason = match (node, segment) {
        (Value::Object(_), Segment::Index(idx)) => {
            format!("'{}' is a mapping, cannot take index {}", at, idx)
        }
        (Value::Array(_), Segment::Key(key)) => {
            format!("'{}' is a sequence, cannot take key '{}'", at, key)
        }
        _ => format!("'{}' is a {}, not a container", at, super::ValueKind::of(node)),
    };
    MigrateError::tree(path, reason)
}

/// Remove and return the value at `path`. Missing paths return `None`.
pub fn remove(tree: &mut Value, path: &TreePath) -> Option<Value> {
    let (last, parents) = path.segments().split_last()?;
    match (get_mut(tree, parents)?, last) {
        (Value::Object(map), Segment::Key(key)) => map.shift_remove(key),
        (Value::Array(items), Segment::Index(idx)) if *idx < items.len() => {
            Some(items.remove(*idx))
        }
        _ => None,
    }
}

/// Remove the value at `path`, then remove every ancestor container left
/// empty by the removal, walking upward until a non-empty one is found.
pub fn remove_and_prune(tree: &mut Value, path: &TreePath) -> Option<Value> {
    let removed = remove(tree, path)?;
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if ancestor.is_root() {
            break;
        }
        let empty = match get(tree, &ancestor) {
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            _ => false,
        };
        if !empty {
            break;
        }
        remove(tree, &ancestor);
        current = ancestor.parent();
    }
    Some(removed)
}

/// Every path reachable by descending mappings.
///
/// Sequence elements are not entered; a sequence contributes only its own
/// path. Empty mappings contribute their own path but nothing beneath.
pub fn all_paths(tree: &Value) -> BTreeSet<TreePath> {
    let mut paths = BTreeSet::new();
    collect_mapping_paths(tree, &TreePath::root(), &mut paths);
    paths
}

fn collect_mapping_paths(node: &Value, prefix: &TreePath, out: &mut BTreeSet<TreePath>) {
    if let Value::Object(map) = node {
        for (key, value) in map {
            let path = prefix.key(key.as_str());
            collect_mapping_paths(value, &path, out);
            out.insert(path);
        }
    }
}

/// Mapping paths plus the keys of mappings held in sequences.
///
/// This is the search space for relocated settings: a value that used to
/// live at `serviceAccount.name` may now live at `accounts[0].name`. Order
/// follows the tree (depth-first, document order).
pub fn searchable_paths(tree: &Value) -> Vec<TreePath> {
    let mut paths = Vec::new();
    collect_searchable(tree, &TreePath::root(), &mut paths);
    paths
}

fn collect_searchable(node: &Value, prefix: &TreePath, out: &mut Vec<TreePath>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let path = prefix.key(key.as_str());
                out.push(path.clone());
                collect_searchable(value, &path, out);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                if matches!(item, Value::Object(map) if !map.is_empty()) {
                    collect_searchable(item, &prefix.index(idx), out);
                }
            }
        }
        _ => {}
    }
}

/// Every non-mapping value reachable through mappings alone, with its path.
///
/// A sequence is a single field: its items are never entered, so no
/// returned path contains an index. Empty mappings are not fields.
pub fn fields(tree: &Value) -> Vec<(TreePath, &Value)> {
    let mut out = Vec::new();
    collect_fields(tree, TreePath::root(), &mut out);
    out
}

fn collect_fields<'a>(node: &'a Value, path: TreePath, out: &mut Vec<(TreePath, &'a Value)>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                collect_fields(value, path.key(key.as_str()), out);
            }
        }
        _ if path.is_root() => {}
        value => out.push((path, value)),
    }
}

/// Number of [`fields`] beneath `value`; zero for anything but a mapping.
pub fn count_fields(value: &Value) -> usize {
    fields(value).len()
}

/// Maximum nesting depth; a scalar root has depth 0.
pub fn max_depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(max_depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(max_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Structural equality where numbers compare by value, so `30` equals `30.0`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| deep_equal(value, other)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| deep_equal(a, b))
        }
        _ => a == b,
    }
}
