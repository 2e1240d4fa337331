//! Conflict-log serialization.

use crate::error::{MigrateError, Result};
use crate::merge::{ConflictLogEntry, MergeStatistics};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Column order of the CSV export.
pub const CSV_COLUMNS: [&str; 8] = [
    "timestamp",
    "path",
    "action_type",
    "source_value",
    "target_value",
    "new_default_value",
    "reason",
    "manual_review",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Csv,
}

impl LogFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Render `log` in this format.
    pub fn render(self, log: &[ConflictLogEntry], now: DateTime<Utc>) -> Result<String> {
        match self {
            LogFormat::Json => render_json(log, now),
            LogFormat::Csv => Ok(render_csv(log)),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    migration_summary: Summary,
    conflicts: &'a [ConflictLogEntry],
}

#[derive(Serialize)]
struct Summary {
    timestamp: String,
    total_entries: usize,
    manual_review_required: usize,
    statistics: MergeStatistics,
}

/// The log as `{"migration_summary": {...}, "conflicts": [...]}`.
pub fn render_json(log: &[ConflictLogEntry], now: DateTime<Utc>) -> Result<String> {
    let statistics = MergeStatistics::from_log(log);
    let envelope = Envelope {
        migration_summary: Summary {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            total_entries: log.len(),
            manual_review_required: statistics.manual_review_count,
            statistics,
        },
        conflicts: log,
    };
    serde_json::to_string_pretty(&envelope)
        .map_err(|e| MigrateError::Output(format!("cannot serialize conflict log: {}", e)))
}

/// The log as CSV with a header row.
///
/// Null values are empty cells; mappings and sequences are written as
/// compact JSON. An empty log yields one row of empty cells so the file
/// still has the expected shape.
pub fn render_csv(log: &[ConflictLogEntry]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_COLUMNS.iter().map(|c| c.to_string()));

    if log.is_empty() {
        push_row(
            &mut out,
            CSV_COLUMNS.iter().enumerate().map(|(i, _)| {
                if i == CSV_COLUMNS.len() - 1 {
                    "false".to_string()
                } else {
                    String::new()
                }
            }),
        );
        return out;
    }

    for entry in log {
        push_row(
            &mut out,
            [
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                entry.path.to_string(),
                entry.action.to_string(),
                cell(&entry.source_value),
                cell(&entry.target_value),
                cell(&entry.new_default_value),
                entry.reason.clone(),
                entry.manual_review.to_string(),
            ],
        );
    }
    out
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_row<I: IntoIterator<Item = String>>(out: &mut String, fields: I) {
    let row: Vec<String> = fields.into_iter().map(|f| quote(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it holds a delimiter, quote or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
