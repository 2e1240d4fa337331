//! Candidate discovery for orphaned customizations.

use super::signals::{CandidateSignal, Orphan, SearchSpace, default_signals};
use super::types::{DiscoveredMigration, DiscoveryTier, MigrationCandidate, MigrationType};
use crate::config::{DiscoverySettings, RenameScope};
use crate::differ::DeltaEntry;
use crate::merge::RenameMap;
use crate::tree::{ConfigTree, TreePath};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Runs every signal against every orphan and ranks what they find.
pub struct DiscoveryEngine {
    settings: DiscoverySettings,
    signals: Vec<Box<dyn CandidateSignal>>,
}

impl DiscoveryEngine {
    /// An engine using the four standard signals.
    pub fn new(settings: DiscoverySettings) -> Self {
        let signals = default_signals(&settings);
        Self { settings, signals }
    }

    /// An engine using a caller-supplied signal set.
    pub fn with_signals(settings: DiscoverySettings, signals: Vec<Box<dyn CandidateSignal>>) -> Self {
        Self { settings, signals }
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Look for new homes for `orphans` in `template_new`.
    ///
    /// Orphans without any candidate are left out. The result is sorted by
    /// confidence, highest first.
    pub fn discover(&self, orphans: &[DeltaEntry], template_new: &ConfigTree) -> Vec<DiscoveredMigration> {
        let space = SearchSpace::new(template_new);
        info!(
            orphans = orphans.len(),
            search_paths = space.paths().len(),
            "starting migration discovery"
        );

        let mut migrations: Vec<DiscoveredMigration> = orphans
            .iter()
            .filter_map(|orphan| self.analyze(orphan, &space))
            .collect();
        migrations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(migrations = migrations.len(), "discovery complete");
        migrations
    }

    fn analyze(&self, delta: &DeltaEntry, space: &SearchSpace<'_>) -> Option<DiscoveredMigration> {
        let orphan = Orphan {
            path: &delta.path,
            value: &delta.value,
        };

        let mut found = Vec::new();
        for signal in &self.signals {
            match signal.candidates(orphan, space) {
                Ok(candidates) => found.extend(candidates),
                Err(e) => warn!(
                    path = %delta.path,
                    signal = signal.name(),
                    error = %e,
                    "signal failed, continuing without it"
                ),
            }
        }

        let candidates = rank(found);
        let best = candidates.first()?.clone();
        debug!(
            path = %delta.path,
            candidates = candidates.len(),
            best = %best.new_path,
            score = best.score,
            "candidates ranked"
        );

        Some(DiscoveredMigration {
            old_path: delta.path.clone(),
            custom_value: delta.value.clone(),
            migration_type: MigrationType::classify(&delta.path, &best.new_path),
            confidence: best.score,
            tier: self.tier(best.score, best.requires_review),
            best_candidate: best,
            candidates,
        })
    }

    /// Confidence band for a best candidate.
    ///
    /// Flagged candidates never auto-apply, whatever their score.
    pub fn tier(&self, confidence: f64, flagged: bool) -> DiscoveryTier {
        if confidence >= self.settings.auto_apply_threshold && !flagged {
            DiscoveryTier::AutoApply
        } else if confidence >= self.settings.suggest_threshold {
            DiscoveryTier::Review
        } else {
            DiscoveryTier::LowConfidence
        }
    }

    /// Build a rename map from the migrations `scope` admits.
    ///
    /// Migrations are taken in order, so when two orphans compete for one
    /// target the more confident one keeps it. Renames that would close a
    /// cycle are skipped.
    pub fn rename_map(&self, migrations: &[DiscoveredMigration], scope: RenameScope) -> RenameMap {
        let mut map = RenameMap::new();
        let mut claimed: BTreeSet<&TreePath> = BTreeSet::new();

        for migration in migrations.iter().filter(|m| scope.admits(m.tier)) {
            let target = &migration.best_candidate.new_path;
            if !claimed.insert(target) {
                debug!(
                    old = %migration.old_path,
                    target = %target,
                    "target already claimed by a more confident migration"
                );
                continue;
            }
            let fields = migration.best_candidate.field_mapping.clone().unwrap_or_default();
            if !map.try_insert(migration.old_path.clone(), target.clone(), fields) {
                warn!(old = %migration.old_path, target = %target, "discovered rename skipped");
            }
        }
        map
    }
}

/// One candidate per target path, best score first.
///
/// Scores are clamped to [0, 1] and non-finite scores are dropped. A later
/// candidate replaces an earlier one for the same path only when it scores
/// strictly higher.
fn rank(found: Vec<MigrationCandidate>) -> Vec<MigrationCandidate> {
    let mut slots: HashMap<TreePath, usize> = HashMap::with_capacity(found.len());
    let mut ranked: Vec<MigrationCandidate> = Vec::with_capacity(found.len());
    for mut candidate in found {
        if !candidate.score.is_finite() {
            continue;
        }
        candidate.score = candidate.score.clamp(0.0, 1.0);
        match slots.get(&candidate.new_path).copied() {
            Some(slot) if candidate.score > ranked[slot].score => ranked[slot] = candidate,
            Some(_) => {}
            None => {
                slots.insert(candidate.new_path.clone(), ranked.len());
                ranked.push(candidate);
            }
        }
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
