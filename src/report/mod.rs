//! Conflict-log export and run summary.
//!
//! The conflict log is written either as a JSON document with a summary
//! envelope or as a flat CSV with one row per entry. The run summary is the
//! console view of the same log: counts, the paths that need a human, and
//! recommendations.

mod conflict_log;
mod summary;


pub use conflict_log::{CSV_COLUMNS, LogFormat, render_csv, render_json};
pub use summary::RunSummary;

/// Output format for human-facing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

impl ReportFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}
