//! End-to-end migration.
//!
//! Differ, first merge pass, discovery on the orphans, second merge pass
//! with the discovered renames layered under the user's map, then the
//! transformation detector. Every stage works on its own copy of the trees.

use crate::config::{RenameScope, Settings};
use crate::differ::DeltaEntry;
use crate::discovery::{DiscoveredMigration, DiscoveryEngine};
use crate::merge::{ConflictLogEntry, MergeEngine, MergeOutcome, RenameMap};
use crate::transform::{AppliedTransformations, TransformDetector, TransformationRecord};
use crate::tree::ConfigTree;
use tracing::{info, warn};

/// Which optional stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOptions {
    pub discovery: bool,
    pub transform: bool,
    /// Apply Move records to the final tree, not just report them.
    pub apply_transforms: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            discovery: true,
            transform: true,
            apply_transforms: true,
        }
    }
}

/// Everything one migration run produced.
#[derive(Debug, Clone)]
pub struct MigrationRun {
    /// The final configuration tree.
    pub tree: ConfigTree,
    /// The conflict log of the final merge pass.
    pub log: Vec<ConflictLogEntry>,
    /// Customizations still without a home after the final pass.
    pub orphans: Vec<DeltaEntry>,
    pub discovered: Vec<DiscoveredMigration>,
    /// Renames discovery fed into the second pass.
    pub discovered_renames: RenameMap,
    pub transformations: Vec<TransformationRecord>,
    pub applied: Option<AppliedTransformations>,
}

/// A configured migration pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
    stages: StageOptions,
}

impl Pipeline {
    pub fn new(settings: Settings, stages: StageOptions) -> Self {
        Self { settings, stages }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Migrate `golden` from `template_old` to `template_new`.
    pub fn run(
        &self,
        golden: &ConfigTree,
        template_old: &ConfigTree,
        template_new: &ConfigTree,
        user_map: Option<&RenameMap>,
    ) -> MigrationRun {
        let merge = MergeEngine::new(template_old, template_new);
        let first = merge.merge(golden, user_map);

        let (outcome, discovered, discovered_renames) = if self.stages.discovery {
            self.second_pass(&merge, golden, first, user_map)
        } else {
            (first, Vec::new(), RenameMap::new())
        };

        let mut tree = outcome.tree;
        let mut transformations = Vec::new();
        let mut applied = None;
        if self.stages.transform {
            let detector = TransformDetector::new(self.settings.transform.clone());
            transformations = detector.detect(&tree, template_new);
            if self.stages.apply_transforms
                && self.settings.transform.apply_moves
                && !transformations.is_empty()
            {
                let result = detector.apply(&tree, &transformations);
                tree = result.tree.clone();
                applied = Some(result);
            }
        }

        info!(
            entries = outcome.log.len(),
            orphans = outcome.orphans.len(),
            discovered_renames = discovered_renames.len(),
            transformations = transformations.len(),
            "migration complete"
        );
        MigrationRun {
            tree,
            log: outcome.log,
            orphans: outcome.orphans,
            discovered,
            discovered_renames,
            transformations,
            applied,
        }
    }

    /// Discovery on the first pass's orphans, and a second pass if it found
    /// renames worth applying.
    fn second_pass(
        &self,
        merge: &MergeEngine<'_>,
        golden: &ConfigTree,
        first: MergeOutcome,
        user_map: Option<&RenameMap>,
    ) -> (MergeOutcome, Vec<DiscoveredMigration>, RenameMap) {
        if first.orphans.is_empty() {
            return (first, Vec::new(), RenameMap::new());
        }

        let engine = DiscoveryEngine::new(self.settings.discovery.clone());
        let discovered = engine.discover(&first.orphans, merge.template_new());
        let renames = engine.rename_map(&discovered, self.settings.discovery.rename_scope);
        if renames.is_empty() {
            return (first, discovered, renames);
        }

        let mut combined = user_map.cloned().unwrap_or_default();
        for old in combined.layer_under(&renames) {
            warn!(path = %old, "discovered rename conflicts with the rename map, skipped");
        }
        info!(renames = renames.len(), "re-running merge with discovered renames");
        (merge.merge(golden, Some(&combined)), discovered, renames)
    }

    /// Run only as far as discovery: first merge pass, then candidate
    /// search for its orphans.
    pub fn discover(
        &self,
        golden: &ConfigTree,
        template_old: &ConfigTree,
        template_new: &ConfigTree,
        user_map: Option<&RenameMap>,
    ) -> Vec<DiscoveredMigration> {
        let merge = MergeEngine::new(template_old, template_new);
        let first = merge.merge(golden, user_map);
        DiscoveryEngine::new(self.settings.discovery.clone()).discover(&first.orphans, template_new)
    }

    /// Widen the rename scope, e.g. when the user opts into review renames.
    pub fn with_rename_scope(mut self, scope: RenameScope) -> Self {
        self.settings.discovery.rename_scope = scope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConflictAction;
    use crate::tree::{self, p};
    use serde_json::json;

    fn pipeline() -> Pipeline {
        Pipeline::new(Settings::default(), StageOptions::default())
    }

    #[test]
    fn test_run_without_customizations_yields_new_template() {
        let old = json!({"service": {"timeout": 30}});
        let new = json!({"service": {"timeout": 45, "retries": 2}});

        let run = pipeline().run(&old, &old, &new, None);

        assert_eq!(run.tree, new);
        assert!(run.log.is_empty());
        assert!(run.transformations.is_empty());
    }

    #[test]
    fn test_run_rehomes_relocated_setting() {
        let golden = json!({"serviceAccount": {"name": "acct"}, "replicas": 3});
        let old = json!({"serviceAccount": {"name": ""}, "replicas": 1});
        let new = json!({
            "replicas": 1,
            "autoCreateResources": {"serviceAccounts": {"accounts": [{"serviceAccountName": ""}]}}
        });

        let run = pipeline().run(&golden, &old, &new, None);

        let target = p("autoCreateResources.serviceAccounts.accounts[0].serviceAccountName");
        assert_eq!(tree::get(&run.tree, &target), Some(&json!("acct")));
        assert_eq!(run.tree["replicas"], json!(3));
        assert!(!tree::exists(&run.tree, &p("serviceAccount")));
        assert_eq!(run.discovered_renames.len(), 1);
        assert!(run.orphans.is_empty());
        assert!(run.log.iter().any(|e| e.action == ConflictAction::Migrated));
    }

    #[test]
    fn test_run_keeps_customized_list_longer_than_template_list() {
        let golden = json!({"a": {"ports": [80, 443, 8080]}});
        let old = json!({"a": {"ports": [80]}});
        let new = json!({"a": {"ports": [80]}, "b": {"ports": [80, 443]}});

        let run = pipeline().run(&golden, &old, &new, None);

        assert_eq!(run.tree["a"]["ports"], json!([80, 443, 8080]));
        assert_eq!(run.tree["b"]["ports"], json!([80, 443]));
        assert!(run.transformations.is_empty());
    }

    #[test]
    fn test_user_map_wins_over_discovery() {
        let golden = json!({"serviceAccount": {"name": "acct"}});
        let old = json!({"serviceAccount": {"name": ""}});
        let new = json!({
            "sa": {"accountName": ""},
            "autoCreateResources": {"serviceAccounts": {"accounts": [{"serviceAccountName": ""}]}}
        });
        let user = RenameMap::from_pairs([("serviceAccount.name", "sa.accountName")]).unwrap();

        let run = pipeline().run(&golden, &old, &new, Some(&user));

        assert_eq!(run.tree["sa"]["accountName"], json!("acct"));
        assert!(run.discovered.is_empty());
    }

    #[test]
    fn test_disabled_discovery_leaves_orphans() {
        let golden = json!({"serviceAccount": {"name": "acct"}});
        let old = json!({"serviceAccount": {"name": ""}});
        let new = json!({"accounts": [{"serviceAccountName": ""}]});
        let stages = StageOptions {
            discovery: false,
            ..StageOptions::default()
        };

        let run = Pipeline::new(Settings::default(), stages).run(&golden, &old, &new, None);

        assert_eq!(run.orphans.len(), 1);
        assert!(run.discovered.is_empty());
    }

    #[test]
    fn test_discover_only() {
        let golden = json!({"serviceAccount": {"name": "acct"}});
        let old = json!({"serviceAccount": {"name": ""}});
        let new = json!({"autoCreateResources": {"serviceAccounts": {"accounts": [{"serviceAccountName": ""}]}}});

        let migrations = pipeline().discover(&golden, &old, &new, None);

        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].old_path, p("serviceAccount.name"));
    }
}
