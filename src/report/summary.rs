//! End-of-run summary.

use crate::merge::{ConflictAction, ConflictLogEntry, MergeStatistics};
use crate::tree::TreePath;
use serde::Serialize;
use std::fmt;

/// Console and JSON summary of one migration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_conflicts: usize,
    pub manual_review_required: usize,
    pub statistics: MergeStatistics,
    /// Every path flagged for manual review, in log order.
    pub critical_paths: Vec<TreePath>,
    pub recommendations: Vec<String>,
    pub success_rate: f64,
    /// Renames discovered and fed into the second merge pass.
    pub discovered_renames: usize,
    /// Transformation records detected after the merge.
    pub transformations: usize,
    /// How many critical paths the text rendering lists.
    #[serde(skip)]
    pub shown_paths: usize,
}

impl RunSummary {
    pub fn from_log(log: &[ConflictLogEntry], shown_paths: usize) -> Self {
        let statistics = MergeStatistics::from_log(log);
        let critical_paths = log
            .iter()
            .filter(|entry| entry.manual_review)
            .map(|entry| entry.path.clone())
            .collect();
        Self {
            total_conflicts: log.len(),
            manual_review_required: statistics.manual_review_count,
            recommendations: recommendations(&statistics),
            success_rate: statistics.success_rate(),
            statistics,
            critical_paths,
            discovered_renames: 0,
            transformations: 0,
            shown_paths,
        }
    }

    pub fn with_discovered_renames(mut self, count: usize) -> Self {
        self.discovered_renames = count;
        self
    }

    pub fn with_transformations(mut self, count: usize) -> Self {
        self.transformations = count;
        self
    }
}

fn recommendations(stats: &MergeStatistics) -> Vec<String> {
    let mut out = Vec::new();

    if stats.manual_review_count > 0 {
        out.push(format!(
            "Manual review required for {} configuration changes. \
             Review entries marked with 'manual_review': true before deployment.",
            stats.manual_review_count
        ));
    }
    if stats.data_loss_count > 0 {
        out.push(format!(
            "Potential data loss detected in {} configurations. \
             Verify that removed or incompatible settings are intentional.",
            stats.data_loss_count
        ));
    }
    if stats.total == 0 {
        out.push("No conflicts detected. Configuration migration completed successfully.".to_string());
    } else if stats.manual_review_count * 2 > stats.total {
        out.push(
            "High number of manual review items detected. Consider reviewing template \
             compatibility or providing a migration map for renamed fields."
                .to_string(),
        );
    }
    let mismatches = stats.count(ConflictAction::StructuralMismatch);
    if mismatches > 0 {
        out.push(format!(
            "{} structural mismatches found. These may indicate \
             incompatible changes in the new template version.",
            mismatches
        ));
    }
    out
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration summary")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "  Conflict log entries:   {}", self.total_conflicts)?;
        for action in ConflictAction::ALL {
            let count = self.statistics.count(action);
            if count > 0 {
                writeln!(f, "    {:<20} {}", action.as_str(), count)?;
            }
        }
        writeln!(f, "  Manual review required: {}", self.manual_review_required)?;
        writeln!(f, "  Success rate:           {:.1}%", self.success_rate)?;
        if self.discovered_renames > 0 {
            writeln!(f, "  Discovered renames:     {}", self.discovered_renames)?;
        }
        if self.transformations > 0 {
            writeln!(f, "  Transformations:        {}", self.transformations)?;
        }

        if !self.critical_paths.is_empty() {
            writeln!(f)?;
            writeln!(f, "Critical paths:")?;
            for path in self.critical_paths.iter().take(self.shown_paths) {
                writeln!(f, "  - {}", path)?;
            }
            let hidden = self.critical_paths.len().saturating_sub(self.shown_paths);
            if hidden > 0 {
                writeln!(f, "  ... and {} more", hidden)?;
            }
        }

        if !self.recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  * {}", rec)?;
            }
        }
        Ok(())
    }
}
