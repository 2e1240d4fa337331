//! Transformation report.

use super::types::{AppliedTransformations, TransformationRecord};
use crate::error::{MigrateError, Result};
use crate::tree::TreePath;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Detected records, plus what happened when they were applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationReport {
    pub transformations: Vec<TransformationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<AppliedSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedSummary {
    pub applied: Vec<TreePath>,
    pub deferred: Vec<TreePath>,
    pub skipped: Vec<TreePath>,
}

impl TransformationReport {
    pub fn new(transformations: Vec<TransformationRecord>) -> Self {
        Self {
            transformations,
            applied: None,
        }
    }

    pub fn with_applied(mut self, result: &AppliedTransformations) -> Self {
        self.applied = Some(AppliedSummary {
            applied: result.applied.clone(),
            deferred: result.deferred.clone(),
            skipped: result.skipped.clone(),
        });
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            MigrateError::Output(format!("cannot serialize transformation report: {}", e))
        })
    }
}

fn shown(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for TransformationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.transformations.is_empty() {
            writeln!(f, "No path transformations detected.")?;
        } else {
            writeln!(
                f,
                "Detected {} potential path transformation(s):",
                self.transformations.len()
            )?;
            writeln!(f)?;
            for (i, t) in self.transformations.iter().enumerate() {
                let suffix = if t.is_object_move() { ".*" } else { "" };
                writeln!(f, "{}. {} → {}{}", i + 1, t.old_path, t.new_path, suffix)?;
                writeln!(f, "   Value: {}", shown(&t.value))?;
                writeln!(f, "   Recommendation: {}", t.recommendation)?;
                writeln!(f, "   Reason: {}", t.reason)?;
                writeln!(f, "   Confidence: {}", t.confidence)?;
                writeln!(f)?;
            }
        }

        if let Some(applied) = &self.applied {
            writeln!(
                f,
                "Applied: {}, deferred: {}, skipped: {}",
                applied.applied.len(),
                applied.deferred.len(),
                applied.skipped.len()
            )?;
            for path in &applied.deferred {
                writeln!(f, "  ! {} removed; copy its fields to the new location by hand", path)?;
            }
        }
        Ok(())
    }
}
