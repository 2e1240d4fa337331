//! Tests for settings functionality.

use crate::config::{RenameScope, Settings};
use crate::error::MigrateError;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    let d = &settings.discovery;
    assert_eq!(d.auto_apply_threshold, 0.8);
    assert_eq!(d.suggest_threshold, 0.5);
    assert_eq!(d.medium_confidence_threshold, 0.6);
    assert_eq!(d.low_confidence_threshold, 0.4);
    assert_eq!(d.field_name_threshold, 0.6);
    assert_eq!(d.field_name_review_below, 0.8);
    assert_eq!(d.value_pattern_threshold, 0.5);
    assert_eq!(d.value_pattern_review_below, 0.7);
    assert_eq!(d.structural_threshold, 0.4);
    assert_eq!(d.structural_review_below, 0.7);
    assert_eq!(d.semantic_review_below, 0.8);
    assert_eq!(d.structural_weights.prefix, 0.4);
    assert_eq!(d.value_weights.pattern, 0.7);
    assert_eq!(d.semantic_weights.base, 0.6);
    assert_eq!(d.rename_scope, RenameScope::AutoApplyOnly);
    assert_eq!(settings.transform.object_move_ratio, 0.5);
    assert_eq!(settings.transform.min_object_fields, 2);
    assert!(settings.transform.apply_moves);
    assert_eq!(settings.summary.critical_paths_shown, 5);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_auto_apply_threshold_exceeds_suggest_threshold() {
    let settings = Settings::default();
    assert!(settings.discovery.auto_apply_threshold > settings.discovery.suggest_threshold);
}

#[test]
fn test_parse_minimal_yaml() {
    let settings = Settings::from_yaml("").unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
discovery:
  auto_apply_threshold: 0.9
  rename_scope: include_review
transform:
  apply_moves: false
"#;
    let settings = Settings::from_yaml(yaml).unwrap();

    // Specified values should be used
    assert_eq!(settings.discovery.auto_apply_threshold, 0.9);
    assert_eq!(settings.discovery.rename_scope, RenameScope::IncludeReview);
    assert!(!settings.transform.apply_moves);

    // Unspecified values should use defaults
    assert_eq!(settings.discovery.suggest_threshold, 0.5);
    assert_eq!(settings.transform.min_object_fields, 2);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
future_section:
  knob: 1
discovery:
  brand_new_signal: 0.3
"#;
    let settings = Settings::from_yaml(yaml).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_nested_weights_partial_override() {
    let yaml = r#"
discovery:
  structural_weights:
    prefix: 0.5
    depth: 0.2
"#;
    let settings = Settings::from_yaml(yaml).unwrap();
    let weights = settings.discovery.structural_weights;
    assert_eq!(weights.prefix, 0.5);
    assert_eq!(weights.depth, 0.2);
    assert_eq!(weights.keywords, 0.3);
}

#[test]
fn test_validation_rejects_out_of_range_threshold() {
    let result = Settings::from_yaml("discovery:\n  field_name_threshold: 1.5\n");
    let err = result.unwrap_err();
    assert!(matches!(err, MigrateError::Config(_)));
    assert!(err.to_string().contains("discovery.field_name_threshold"));
}

#[test]
fn test_validation_rejects_inverted_confidence_gates() {
    let yaml = "discovery:\n  auto_apply_threshold: 0.5\n  suggest_threshold: 0.5\n";
    let err = Settings::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("must be greater than"));
}

#[test]
fn test_validation_rejects_unordered_guidance_bands() {
    let yaml = "discovery:\n  medium_confidence_threshold: 0.3\n  low_confidence_threshold: 0.4\n";
    let err = Settings::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, MigrateError::Config(_)));
    assert!(err.to_string().contains("guidance bands"));

    let yaml = "discovery:\n  medium_confidence_threshold: 0.9\n";
    assert!(Settings::from_yaml(yaml).is_err());
}

#[test]
fn test_validation_rejects_weights_not_summing_to_one() {
    let yaml = "discovery:\n  value_weights:\n    pattern: 0.5\n    length: 0.3\n";
    let err = Settings::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("discovery.value_weights must sum to 1"));
}

#[test]
fn test_validation_rejects_zero_min_object_fields() {
    let err = Settings::from_yaml("transform:\n  min_object_fields: 0\n").unwrap_err();
    assert!(err.to_string().contains("min_object_fields"));
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = Settings::from_yaml("discovery: [not, a, mapping").unwrap_err();
    assert!(matches!(err, MigrateError::Config(_)));
}

#[test]
fn test_rename_scope_from_str() {
    assert_eq!(
        RenameScope::from_str("auto_apply_only"),
        Some(RenameScope::AutoApplyOnly)
    );
    assert_eq!(
        RenameScope::from_str("include_review"),
        Some(RenameScope::IncludeReview)
    );
    assert_eq!(RenameScope::from_str("all"), Some(RenameScope::All));
    assert_eq!(RenameScope::from_str("some"), None);
}

#[test]
fn test_load_from_file_and_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    let mut settings = Settings::default();
    settings.summary.critical_paths_shown = 10;
    std::fs::write(&path, settings.to_yaml().unwrap()).unwrap();

    let loaded = Settings::load(&path).unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_load_missing_file() {
    let result = Settings::load("/nonexistent/settings.yaml");
    assert!(matches!(result, Err(MigrateError::Config(_))));
}

#[test]
fn test_load_or_default() {
    let settings = Settings::load_or_default(None::<&str>).unwrap();
    assert_eq!(settings, Settings::default());
}
