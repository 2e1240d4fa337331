//! End-to-end migrations through the public API.

use config_migrator::config::{DiscoverySettings, Settings, TransformSettings};
use config_migrator::discovery::MigrationType;
use config_migrator::discovery::signals::{
    CandidateSignal, FieldNameSignal, Orphan, SearchSpace, SemanticSignal,
};
use config_migrator::merge::{self, ConflictAction};
use config_migrator::pipeline::{Pipeline, StageOptions};
use config_migrator::transform::{Confidence, Recommendation, TransformDetector};
use config_migrator::tree::{self, TreePath};
use serde_json::json;

fn p(path: &str) -> TreePath {
    TreePath::parse(path).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(Settings::default(), StageOptions::default())
}

// =============================================================================
// Customized values survive default changes
// =============================================================================

#[test]
fn test_customized_value_overwrites_new_default() {
    let golden = json!({"service": {"timeout": 60}});
    let old = json!({"service": {"timeout": 30}});
    let new = json!({"service": {"timeout": 45}});

    let run = pipeline().run(&golden, &old, &new, None);

    assert_eq!(tree::get(&run.tree, &p("service.timeout")), Some(&json!(60)));
    assert_eq!(run.log.len(), 1);
    let entry = &run.log[0];
    assert_eq!(entry.action, ConflictAction::Overwrite);
    assert_eq!(entry.path, p("service.timeout"));
    assert_eq!(entry.source_value, json!(60));
    assert_eq!(entry.new_default_value, json!(45));
    assert!(!entry.manual_review);
}

// =============================================================================
// Removed keys are logged, not carried over
// =============================================================================

#[test]
fn test_customized_list_longer_than_template_list_survives() {
    let golden = json!({"a": {"ports": [80, 443, 8080]}});
    let old = json!({"a": {"ports": [80]}});
    let new = json!({"a": {"ports": [80]}, "b": {"ports": [80, 443]}});

    let run = pipeline().run(&golden, &old, &new, None);

    assert_eq!(tree::get(&run.tree, &p("a.ports")), Some(&json!([80, 443, 8080])));
    assert_eq!(tree::get(&run.tree, &p("b.ports")), Some(&json!([80, 443])));
    assert!(run.transformations.is_empty());
}

#[test]
fn test_removed_key_logged_not_carried_over() {
    let old = json!({"service": {"timeout": 30, "deprecated": "v"}});
    let new = json!({"service": {"timeout": 30}});

    let run = pipeline().run(&old, &old, &new, None);

    let entries: Vec<_> = run
        .log
        .iter()
        .filter(|e| e.path == p("service.deprecated"))
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ConflictAction::Deleted);
    assert!(entries[0].manual_review);
    assert!(!tree::exists(&run.tree, &p("service.deprecated")));
}

#[test]
fn test_customized_removed_key_logged_once() {
    let golden = json!({"service": {"timeout": 30, "deprecated": "custom"}});
    let old = json!({"service": {"timeout": 30, "deprecated": "v"}});
    let new = json!({"service": {"timeout": 30}});

    let outcome = merge::merge(&golden, &old, &new, None);

    let entries: Vec<_> = outcome
        .log
        .iter()
        .filter(|e| e.path == p("service.deprecated"))
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ConflictAction::Deleted);
    assert_eq!(entries[0].source_value, json!("custom"));
    assert_eq!(outcome.orphans.len(), 1);
}

// =============================================================================
// Relocated settings are rediscovered
// =============================================================================

fn relocated_account() -> (serde_json::Value, serde_json::Value, serde_json::Value) {
    let golden = json!({"serviceAccount": {"name": "acct"}});
    let old = json!({"serviceAccount": {"name": ""}});
    let new = json!({
        "autoCreateResources": {
            "serviceAccounts": {"accounts": [{"serviceAccountName": ""}]}
        }
    });
    (golden, old, new)
}

#[test]
fn test_field_name_and_semantic_signals_both_fire() {
    let (_, _, new) = relocated_account();
    let settings = DiscoverySettings::default();
    let space = SearchSpace::new(&new);
    let path = p("serviceAccount.name");
    let value = json!("acct");
    let orphan = Orphan {
        path: &path,
        value: &value,
    };
    let target = p("autoCreateResources.serviceAccounts.accounts[0].serviceAccountName");

    let field = FieldNameSignal::new(&settings).candidates(orphan, &space).unwrap();
    let semantic = SemanticSignal::new(&settings)
        .unwrap()
        .candidates(orphan, &space)
        .unwrap();

    assert!(field.iter().any(|c| c.new_path == target));
    assert!(semantic.iter().any(|c| c.new_path == target));
}

#[test]
fn test_relocated_setting_becomes_path_expansion() {
    let (golden, old, new) = relocated_account();
    let target = p("autoCreateResources.serviceAccounts.accounts[0].serviceAccountName");

    let migrations = pipeline().discover(&golden, &old, &new, None);

    assert_eq!(migrations.len(), 1);
    let m = &migrations[0];
    assert_eq!(m.old_path, p("serviceAccount.name"));
    assert_eq!(m.best_candidate.new_path, target);
    assert_eq!(m.migration_type, MigrationType::PathExpansion);

    let run = pipeline().run(&golden, &old, &new, None);
    assert_eq!(tree::get(&run.tree, &target), Some(&json!("acct")));
    let entry = run
        .log
        .iter()
        .find(|e| e.path == p("serviceAccount.name"))
        .unwrap();
    assert_eq!(entry.action, ConflictAction::Migrated);
    assert!(entry.manual_review);
}

// =============================================================================
// Duplicates left behind by a merge are moved
// =============================================================================

#[test]
fn test_duplicate_value_moved_to_reference_path() {
    let merged = json!({"a": {"x": "v"}, "b": {"x": "v"}});
    let reference = json!({"b": {"x": ""}});
    let detector = TransformDetector::new(TransformSettings::default());

    let records = detector.detect(&merged, &reference);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].old_path, p("a.x"));
    assert_eq!(records[0].new_path, p("b.x"));
    assert_eq!(records[0].recommendation, Recommendation::Move);
    assert_eq!(records[0].confidence, Confidence::High);

    let applied = detector.apply(&merged, &records);
    assert_eq!(applied.tree, json!({"b": {"x": "v"}}));
}

#[test]
fn test_duplicate_list_moved_whole() {
    let merged = json!({"a": {"ports": [80, 443, 8080]}, "b": {"ports": [80, 443, 8080]}});
    let reference = json!({"b": {"ports": [80]}});
    let detector = TransformDetector::new(TransformSettings::default());

    let records = detector.detect(&merged, &reference);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].old_path, p("a.ports"));
    assert_eq!(records[0].new_path, p("b.ports"));
    let applied = detector.apply(&merged, &records);
    assert_eq!(applied.tree, json!({"b": {"ports": [80, 443, 8080]}}));
}

#[test]
fn test_pipeline_cleans_duplicate_after_merge() {
    let golden = json!({"a": {"x": "v"}, "b": {"x": "v"}});
    let old = json!({"a": {"x": ""}, "b": {"x": ""}});
    let new = json!({"a": {"x": ""}, "b": {"x": ""}});
    let reference_only_b = json!({"b": {"x": ""}});

    let detector = TransformDetector::new(TransformSettings::default());
    let run = Pipeline::new(
        Settings::default(),
        StageOptions {
            transform: false,
            ..StageOptions::default()
        },
    )
    .run(&golden, &old, &new, None);
    let records = detector.detect(&run.tree, &reference_only_b);

    assert_eq!(records.len(), 1);
    assert_eq!(detector.apply(&run.tree, &records).tree, json!({"b": {"x": "v"}}));
}
