//! Discovery report: what was found, how confident it is, and what a human
//! should check before applying the rest.

use super::types::{DiscoveredMigration, DiscoveryTier, MigrationCandidate, MigrationType};
use crate::config::DiscoverySettings;
use crate::error::{MigrateError, Result};
use crate::tree::TreePath;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Keys above which a migrated mapping is considered complex.
const COMPLEX_OBJECT_KEYS: usize = 3;

/// Alternatives listed in review guidance.
const GUIDANCE_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    pub total_migrations: usize,
    pub auto_apply_count: usize,
    pub review_required_count: usize,
    pub low_confidence_count: usize,
}

/// One migration as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub old_path: TreePath,
    pub custom_value: Value,
    pub suggested_new_path: TreePath,
    pub confidence: f64,
    pub migration_type: MigrationType,
    pub evidence: String,
    pub requires_review: bool,
    pub alternatives_count: usize,
}

impl From<&DiscoveredMigration> for ReportEntry {
    fn from(m: &DiscoveredMigration) -> Self {
        Self {
            old_path: m.old_path.clone(),
            custom_value: m.custom_value.clone(),
            suggested_new_path: m.best_candidate.new_path.clone(),
            confidence: m.confidence,
            migration_type: m.migration_type,
            evidence: m.best_candidate.evidence.clone(),
            requires_review: m.best_candidate.requires_review,
            alternatives_count: m.alternatives().len(),
        }
    }
}

/// What a reviewer should know about one suggested migration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewGuidance {
    pub old_path: TreePath,
    pub custom_value: Value,
    pub migration_type: MigrationType,
    pub confidence: f64,
    pub primary_suggestion: MigrationCandidate,
    pub alternative_suggestions: Vec<MigrationCandidate>,
    pub recommendation: &'static str,
    pub risks: Vec<&'static str>,
    pub manual_steps: Vec<String>,
}

impl ReviewGuidance {
    pub fn for_migration(m: &DiscoveredMigration, settings: &DiscoverySettings) -> Self {
        Self {
            old_path: m.old_path.clone(),
            custom_value: m.custom_value.clone(),
            migration_type: m.migration_type,
            confidence: m.confidence,
            primary_suggestion: m.best_candidate.clone(),
            alternative_suggestions: m
                .alternatives()
                .iter()
                .take(GUIDANCE_ALTERNATIVES)
                .cloned()
                .collect(),
            recommendation: recommendation(m.confidence, settings),
            risks: risks(m, settings),
            manual_steps: manual_steps(m),
        }
    }
}

fn recommendation(confidence: f64, settings: &DiscoverySettings) -> &'static str {
    if confidence >= settings.auto_apply_threshold {
        "High confidence migration. Safe to apply automatically."
    } else if confidence >= settings.medium_confidence_threshold {
        "Medium confidence migration. Review evidence and apply if appropriate."
    } else if confidence >= settings.low_confidence_threshold {
        "Low confidence migration. Carefully review before applying."
    } else {
        "Very low confidence. Consider manual investigation."
    }
}

fn risks(m: &DiscoveredMigration, settings: &DiscoverySettings) -> Vec<&'static str> {
    let mut risks = Vec::new();
    if m.confidence < settings.suggest_threshold {
        risks.push("Low confidence score may indicate incorrect mapping");
    }
    match m.migration_type {
        MigrationType::PathConsolidation => {
            risks.push("Path consolidation may require additional field mappings")
        }
        MigrationType::StructuralRelocation => {
            risks.push("Structural changes may affect dependent configurations")
        }
        _ => {}
    }
    if m.custom_value.as_object().is_some_and(|map| map.len() > COMPLEX_OBJECT_KEYS) {
        risks.push("Complex object migration may lose nested data");
    }
    risks
}

fn manual_steps(m: &DiscoveredMigration) -> Vec<String> {
    let mut steps = vec![
        format!(
            "Verify that '{}' is the correct target location",
            m.best_candidate.new_path
        ),
        "Check compatibility between old value type and new location".to_string(),
    ];
    if m.best_candidate.field_mapping.is_some() {
        steps.push("Apply field name mappings as needed".to_string());
    }
    steps.push("Test the migrated configuration in a non-production environment".to_string());

    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect()
}

/// The full discovery report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub summary: DiscoverySummary,
    pub auto_apply_migrations: Vec<ReportEntry>,
    pub review_required_migrations: Vec<ReportEntry>,
    pub low_confidence_migrations: Vec<ReportEntry>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub review_guidance: Vec<ReviewGuidance>,
}

impl DiscoveryReport {
    /// Bucket `migrations` by tier and derive recommendations.
    pub fn build(migrations: &[DiscoveredMigration], settings: &DiscoverySettings) -> Self {
        let bucket = |tier: DiscoveryTier| -> Vec<ReportEntry> {
            migrations
                .iter()
                .filter(|m| m.tier == tier)
                .map(ReportEntry::from)
                .collect()
        };
        let auto_apply_migrations = bucket(DiscoveryTier::AutoApply);
        let review_required_migrations = bucket(DiscoveryTier::Review);
        let low_confidence_migrations = bucket(DiscoveryTier::LowConfidence);

        let review_guidance = migrations
            .iter()
            .filter(|m| m.tier == DiscoveryTier::Review)
            .map(|m| ReviewGuidance::for_migration(m, settings))
            .collect();

        Self {
            summary: DiscoverySummary {
                total_migrations: migrations.len(),
                auto_apply_count: auto_apply_migrations.len(),
                review_required_count: review_required_migrations.len(),
                low_confidence_count: low_confidence_migrations.len(),
            },
            auto_apply_migrations,
            review_required_migrations,
            low_confidence_migrations,
            recommendations: recommendations(migrations, settings),
            review_guidance,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MigrateError::Output(format!("cannot serialize discovery report: {}", e)))
    }
}

fn recommendations(migrations: &[DiscoveredMigration], settings: &DiscoverySettings) -> Vec<String> {
    let mut out = Vec::new();
    let high = migrations
        .iter()
        .filter(|m| m.confidence >= settings.auto_apply_threshold)
        .count();
    let medium = migrations
        .iter()
        .filter(|m| {
            m.confidence >= settings.suggest_threshold && m.confidence < settings.auto_apply_threshold
        })
        .count();

    if migrations.is_empty() {
        out.push(
            "No structural migrations detected. Standard migration should handle all changes."
                .to_string(),
        );
    } else if high == migrations.len() {
        out.push(
            "All migrations have high confidence. Consider enabling automatic application."
                .to_string(),
        );
    } else if medium > 0 {
        out.push(format!(
            "{} migrations require manual review before applying.",
            medium
        ));
    }

    let of_type = |kind: MigrationType| migrations.iter().filter(|m| m.migration_type == kind).count();
    if of_type(MigrationType::PathConsolidation) > 1 {
        out.push("Multiple path consolidations detected. Review for consistency.".to_string());
    }
    if of_type(MigrationType::FieldRename) > 1 {
        out.push("Multiple field renames detected. Verify naming conventions.".to_string());
    }
    out
}

fn write_entries(f: &mut fmt::Formatter<'_>, title: &str, entries: &[ReportEntry]) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))?;
    for entry in entries {
        writeln!(f, "• {} → {}", entry.old_path, entry.suggested_new_path)?;
        writeln!(f, "  Confidence: {:.2}", entry.confidence)?;
        writeln!(f, "  Evidence: {}", entry.evidence)?;
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DYNAMIC MIGRATION DISCOVERY REPORT")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;
        writeln!(f, "Total Migrations Found: {}", self.summary.total_migrations)?;
        writeln!(f, "Auto-Apply Ready: {}", self.summary.auto_apply_count)?;
        writeln!(f, "Review Required: {}", self.summary.review_required_count)?;
        writeln!(f, "Low Confidence: {}", self.summary.low_confidence_count)?;
        writeln!(f)?;

        write_entries(f, "AUTO-APPLY MIGRATIONS", &self.auto_apply_migrations)?;
        write_entries(f, "REVIEW REQUIRED MIGRATIONS", &self.review_required_migrations)?;
        write_entries(f, "LOW CONFIDENCE MIGRATIONS", &self.low_confidence_migrations)?;

        if !self.recommendations.is_empty() {
            writeln!(f, "RECOMMENDATIONS")?;
            writeln!(f, "{}", "-".repeat(15))?;
            for rec in &self.recommendations {
                writeln!(f, "• {}", rec)?;
            }
        }
        Ok(())
    }
}
