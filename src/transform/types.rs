//! Transformation records.

use crate::tree::TreePath;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// What to do about a value found at two live paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Move the value to the new path and delete the old one.
    Move,
    /// Leave both paths in place.
    KeepBoth,
    /// Delete the old path without writing anything.
    RemoveOld,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Move => "move",
            Recommendation::KeepBoth => "keep_both",
            Recommendation::RemoveOld => "remove_old",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that appears at two paths of a merged tree, and the proposed fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationRecord {
    pub old_path: TreePath,
    pub new_path: TreePath,
    /// The shared value, or a summary for whole-object moves.
    pub value: Value,
    pub recommendation: Recommendation,
    pub reason: String,
    pub confidence: Confidence,
    /// Leaf count of the moved object, for whole-object moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fields: Option<usize>,
}

impl TransformationRecord {
    pub fn is_object_move(&self) -> bool {
        self.object_fields.is_some()
    }
}

/// Result of applying transformation records to a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTransformations {
    pub tree: Value,
    /// Old paths that were moved or removed.
    pub applied: Vec<TreePath>,
    /// Whole objects that were removed without copying their fields; the new
    /// location must be checked by hand.
    pub deferred: Vec<TreePath>,
    /// Records whose old path was already gone, or whose new path could not
    /// be written.
    pub skipped: Vec<TreePath>,
}
