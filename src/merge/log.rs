//! Conflict log records produced by the merge engine.
//!
//! Every decision the merge engine takes about a customization that could
//! not be applied silently lands here as one [`ConflictLogEntry`]. Entries
//! are never edited after they are appended; exports write them verbatim.

use crate::tree::TreePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What the merge engine did with one customization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictAction {
    /// Custom value written over the new template default.
    Overwrite,
    /// Custom value dropped because its path no longer exists.
    Deleted,
    /// Value introduced at a path the old template did not have.
    Added,
    /// Shape changed between template versions; new default retained.
    StructuralMismatch,
    /// Custom value relocated to a renamed path.
    Migrated,
}

impl ConflictAction {
    pub const ALL: [ConflictAction; 5] = [
        ConflictAction::Overwrite,
        ConflictAction::Deleted,
        ConflictAction::Added,
        ConflictAction::StructuralMismatch,
        ConflictAction::Migrated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictAction::Overwrite => "OVERWRITE",
            ConflictAction::Deleted => "DELETED",
            ConflictAction::Added => "ADDED",
            ConflictAction::StructuralMismatch => "STRUCTURAL_MISMATCH",
            ConflictAction::Migrated => "MIGRATED",
        }
    }

    /// Parse a user-supplied action name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|action| action.as_str() == upper)
    }

    /// Whether this action means a customization did not make it into the
    /// merged tree.
    pub fn loses_data(self) -> bool {
        matches!(
            self,
            ConflictAction::Deleted | ConflictAction::StructuralMismatch
        )
    }
}

impl std::fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable record in the conflict log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictLogEntry {
    /// When the decision was taken.
    pub timestamp: DateTime<Utc>,

    /// Location the decision applies to.
    pub path: TreePath,

    #[serde(rename = "action_type")]
    pub action: ConflictAction,

    /// The customized value from the golden config.
    pub source_value: Value,

    /// The value that ended up in the merged tree (null if none).
    pub target_value: Value,

    /// The new template's default at this path (null if none).
    pub new_default_value: Value,

    pub reason: String,

    pub manual_review: bool,
}

impl ConflictLogEntry {
    /// Start an entry for `path` with null values and no reason.
    pub fn new(path: TreePath, action: ConflictAction) -> Self {
        Self {
            timestamp: Utc::now(),
            path,
            action,
            source_value: Value::Null,
            target_value: Value::Null,
            new_default_value: Value::Null,
            reason: String::new(),
            manual_review: false,
        }
    }

    pub fn with_source(mut self, value: Value) -> Self {
        self.source_value = value;
        self
    }

    pub fn with_target(mut self, value: Value) -> Self {
        self.target_value = value;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.new_default_value = value;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn needs_review(mut self) -> Self {
        self.manual_review = true;
        self
    }
}

/// Aggregate counts over a conflict log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeStatistics {
    pub total: usize,
    pub by_action_type: BTreeMap<ConflictAction, usize>,
    pub manual_review_count: usize,
    /// Overwrites that did not need review.
    pub successful_overwrites: usize,
    /// Deleted plus StructuralMismatch entries.
    pub data_loss_count: usize,
}

impl MergeStatistics {
    pub fn from_log(log: &[ConflictLogEntry]) -> Self {
        let mut stats = Self {
            total: log.len(),
            ..Self::default()
        };
        for entry in log {
            *stats.by_action_type.entry(entry.action).or_insert(0) += 1;
            if entry.manual_review {
                stats.manual_review_count += 1;
            }
            if entry.action == ConflictAction::Overwrite && !entry.manual_review {
                stats.successful_overwrites += 1;
            }
            if entry.action.loses_data() {
                stats.data_loss_count += 1;
            }
        }
        stats
    }

    pub fn count(&self, action: ConflictAction) -> usize {
        self.by_action_type.get(&action).copied().unwrap_or(0)
    }

    /// Percentage of entries that applied cleanly. An empty log is 100%.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let successful = self.successful_overwrites + self.count(ConflictAction::Added);
        successful as f64 / self.total as f64 * 100.0
    }
}

/// Criteria for narrowing a conflict log. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub action: Option<ConflictAction>,
    pub review_only: bool,
    pub path_contains: Option<String>,
}

impl LogFilter {
    pub fn matches(&self, entry: &ConflictLogEntry) -> bool {
        if self.action.is_some_and(|action| action != entry.action) {
            return false;
        }
        if self.review_only && !entry.manual_review {
            return false;
        }
        match &self.path_contains {
            Some(fragment) => entry.path.to_string().contains(fragment.as_str()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, log: &'a [ConflictLogEntry]) -> Vec<&'a ConflictLogEntry> {
        log.iter().filter(|entry| self.matches(entry)).collect()
    }
}
