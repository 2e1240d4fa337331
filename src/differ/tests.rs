//! Tests for the tree differ.

use super::*;
use crate::tree::p;
use serde_json::json;

fn delta_paths(deltas: &[DeltaEntry]) -> Vec<String> {
    deltas.iter().map(|d| d.path.to_string()).collect()
}

#[test]
fn test_extract_changed_scalar() {
    let golden = json!({"service": {"timeout": 60, "port": 80}});
    let template = json!({"service": {"timeout": 30, "port": 80}});

    let deltas = extract_custom_data(&golden, &template);

    assert_eq!(
        deltas,
        vec![DeltaEntry {
            path: p("service.timeout"),
            value: json!(60),
        }]
    );
}

#[test]
fn test_extract_custom_subtree_captured_once() {
    let golden = json!({
        "service": {"port": 80},
        "extra": {"nested": {"a": 1, "b": 2}, "c": [1, 2]}
    });
    let template = json!({"service": {"port": 80}});

    let deltas = extract_custom_data(&golden, &template);

    assert_eq!(delta_paths(&deltas), ["extra"]);
    assert_eq!(deltas[0].value["nested"]["b"], json!(2));
}

#[test]
fn test_extract_never_returns_parent_and_child() {
    let golden = json!({
        "a": {"b": {"c": 1, "d": {"e": 2}}, "x": 5},
        "f": {"g": 1}
    });
    let template = json!({"a": {"b": {"c": 0}, "x": 4}});

    let deltas = extract_custom_data(&golden, &template);
    let paths: Vec<&TreePath> = deltas.iter().map(|d| &d.path).collect();

    for outer in &paths {
        for inner in &paths {
            assert!(
                !inner.is_descendant_of(outer),
                "{} and its descendant {} both extracted",
                outer,
                inner
            );
        }
    }
    assert_eq!(delta_paths(&deltas), ["a.b.c", "a.b.d", "a.x", "f"]);
}

#[test]
fn test_extract_compares_sequences_whole() {
    let golden = json!({"ports": [80, 443]});
    let template = json!({"ports": [80]});

    let deltas = extract_custom_data(&golden, &template);

    assert_eq!(delta_paths(&deltas), ["ports"]);
    assert_eq!(deltas[0].value, json!([80, 443]));
}

#[test]
fn test_extract_captures_type_change() {
    let golden = json!({"limits": "none"});
    let template = json!({"limits": {"cpu": 1}});

    let deltas = extract_custom_data(&golden, &template);

    assert_eq!(delta_paths(&deltas), ["limits"]);
}

#[test]
fn test_extract_identical_trees_yield_nothing() {
    let tree = json!({"a": {"b": [1, {"c": null}]}, "d": 1.5});
    assert!(extract_custom_data(&tree, &tree).is_empty());
}

#[test]
fn test_extract_ignores_number_representation() {
    let golden = json!({"ratio": 1.0});
    let template = json!({"ratio": 1});
    assert!(extract_custom_data(&golden, &template).is_empty());
}

#[test]
fn test_deleted_and_added_paths() {
    let old = json!({"service": {"deprecated": "v", "port": 80}});
    let new = json!({"service": {"port": 80, "tls": {"enabled": true}}});

    let deleted: Vec<String> = find_deleted_paths(&old, &new)
        .iter()
        .map(|p| p.to_string())
        .collect();
    let added: Vec<String> = find_added_paths(&old, &new)
        .iter()
        .map(|p| p.to_string())
        .collect();

    assert_eq!(deleted, ["service.deprecated"]);
    assert_eq!(added, ["service.tls", "service.tls.enabled"]);
}

#[test]
fn test_structural_type_change() {
    let old = json!({"service": {"timeout": 30, "config": {"a": 1}}});
    let new = json!({"service": {"timeout": "30s", "config": [1]}});

    let changes = find_structural_changes(&old, &new);

    assert_eq!(
        changes.get(&p("service.timeout")).map(String::as_str),
        Some("Type changed from int to str")
    );
    assert_eq!(
        changes.get(&p("service.config")).map(String::as_str),
        Some("Type changed from mapping to sequence")
    );
}

#[test]
fn test_structural_key_set_change() {
    let old = json!({"db": {"host": "h", "user": "u"}});
    let new = json!({"db": {"host": "h", "credentials": {}}});

    let changes = find_structural_changes(&old, &new);

    assert_eq!(
        changes.get(&p("db")).map(String::as_str),
        Some("Structure changed - removed keys: [user], added keys: [credentials]")
    );
    assert_eq!(changes.len(), 1);
}

#[test]
fn test_structural_ignores_value_changes() {
    let old = json!({"a": {"b": 1}});
    let new = json!({"a": {"b": 2}});
    assert!(find_structural_changes(&old, &new).is_empty());
}

#[test]
fn test_template_diff_display() {
    let old = json!({"a": {"gone": 1, "kept": 1}});
    let new = json!({"a": {"kept": "one", "fresh": 2}});

    let diff = TemplateDiff::between(&old, &new);
    let text = diff.to_string();

    assert_eq!(diff.change_count(), 4);
    assert!(text.contains("- a.gone"));
    assert!(text.contains("+ a.fresh"));
    assert!(text.contains("~ a.kept: Type changed from int to str"));
    assert!(text.contains("~ a: Structure changed"));
}

#[test]
fn test_template_diff_empty() {
    let tree = json!({"a": 1});
    let diff = TemplateDiff::between(&tree, &tree);
    assert!(diff.is_empty());
    assert_eq!(diff.to_string(), "No differences found.\n");
}
