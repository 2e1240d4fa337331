//! Tests for tree paths and tree operations.

use super::*;
use serde_json::json;

// =============================================================================
// Path parsing
// =============================================================================

#[test]
fn test_parse_dotted_and_indexed_path() {
    let path = TreePath::parse("global.accounts[0].name").unwrap();
    assert_eq!(
        path.segments(),
        &[
            Segment::Key("global".to_string()),
            Segment::Key("accounts".to_string()),
            Segment::Index(0),
            Segment::Key("name".to_string()),
        ]
    );
    assert_eq!(path.to_string(), "global.accounts[0].name");
    assert_eq!(path.depth(), 4);
}

#[test]
fn test_parse_consecutive_indices() {
    let path = TreePath::parse("matrix[1][2]").unwrap();
    assert_eq!(path.segments().len(), 3);
    assert_eq!(path.to_string(), "matrix[1][2]");
}

#[test]
fn test_quoted_keys_round_trip_through_display() {
    let path = TreePath::root()
        .key("metadata")
        .key("annotations")
        .key("example.com/owner");
    let rendered = path.to_string();
    assert_eq!(rendered, r#"metadata.annotations["example.com/owner"]"#);
    assert_eq!(TreePath::parse(&rendered).unwrap(), path);
}

#[test]
fn test_parse_rejects_malformed_paths() {
    let cases = [
        ("", "path is empty"),
        (".a", "leading separator"),
        ("a.", "trailing separator"),
        ("a..b", "doubled separator"),
        ("a.[0]", "separator must be followed by a key"),
        ("a[0]b", "expected '.' or '[' after a segment"),
        ("a[x]", "must be a non-negative integer"),
        ("a[-1]", "must be a non-negative integer"),
        ("a[0", "unmatched '['"),
        ("a]", "unmatched ']'"),
        (r#"a["b"#, "unterminated quoted key"),
    ];
    for (input, reason) in cases {
        let err = TreePath::parse(input).unwrap_err().to_string();
        assert!(
            err.contains(reason),
            "'{}' should fail with '{}', got '{}'",
            input,
            reason,
            err
        );
    }
}

#[test]
fn test_path_relationships() {
    let parent = p("a.b");
    let child = p("a.b.c");
    assert!(child.is_descendant_of(&parent));
    assert!(!parent.is_descendant_of(&parent));
    assert!(parent.starts_with(&parent));
    assert_eq!(child.parent(), Some(parent.clone()));
    assert_eq!(TreePath::root().parent(), None);
    assert_eq!(p("a.b.x").common_prefix(&p("a.b.y.z")), parent);
    assert_eq!(p("ports[1]").field_name(), Some("ports"));
    assert_eq!(p("a.b").field_name(), Some("b"));
    assert!(p("accounts[0].name").has_index());
    assert!(!p("a.b").has_index());
}

#[test]
fn test_path_serializes_as_string() {
    let path = p("a.b[1]");
    let encoded = serde_json::to_string(&path).unwrap();
    assert_eq!(encoded, r#""a.b[1]""#);
    let decoded: TreePath = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, path);
}

// =============================================================================
// Get / set / remove
// =============================================================================

#[test]
fn test_get_walks_mappings_and_sequences() {
    let tree = json!({"a": {"list": [{"name": "x"}, {"name": "y"}]}});
    assert_eq!(get(&tree, &p("a.list[1].name")), Some(&json!("y")));
    assert_eq!(get(&tree, &p("a.list[5].name")), None);
    assert_eq!(get(&tree, &p("a.missing")), None);
    assert_eq!(get(&tree, &TreePath::root()), Some(&tree));
    assert!(exists(&tree, &p("a.list")));
}

#[test]
fn test_set_creates_intermediate_mappings() {
    let mut tree = json!({});
    set(&mut tree, &p("a.b.c"), json!(1)).unwrap();
    assert_eq!(tree, json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn test_set_replaces_existing_sequence_item() {
    let mut tree = json!({"items": [1, 2, 3]});
    set(&mut tree, &p("items[1]"), json!(20)).unwrap();
    assert_eq!(tree, json!({"items": [1, 20, 3]}));
}

#[test]
fn test_set_through_scalar_fails() {
    let mut tree = json!({"a": 5});
    let err = set(&mut tree, &p("a.b"), json!(1)).unwrap_err();
    assert!(err.to_string().contains("not a container"));
    assert_eq!(tree, json!({"a": 5}));
}

#[test]
fn test_set_out_of_range_index_fails() {
    let mut tree = json!({"items": []});
    assert!(set(&mut tree, &p("items[0]"), json!(1)).is_err());
}

#[test]
fn test_remove_returns_value_and_keeps_order() {
    let mut tree = json!({"a": 1, "b": 2, "c": 3});
    assert_eq!(remove(&mut tree, &p("b")), Some(json!(2)));
    let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["a", "c"]);
    assert_eq!(remove(&mut tree, &p("zzz")), None);
}

#[test]
fn test_remove_and_prune_drops_emptied_ancestors() {
    let mut tree = json!({"a": {"b": {"x": "v"}}, "keep": 1});
    remove_and_prune(&mut tree, &p("a.b.x")).unwrap();
    assert_eq!(tree, json!({"keep": 1}));
}

#[test]
fn test_remove_and_prune_stops_at_non_empty_ancestor() {
    let mut tree = json!({"a": {"b": {"x": "v"}, "c": 1}});
    remove_and_prune(&mut tree, &p("a.b.x")).unwrap();
    assert_eq!(tree, json!({"a": {"c": 1}}));
}

// =============================================================================
// Enumeration
// =============================================================================

#[test]
fn test_all_paths_does_not_enter_sequences() {
    let tree = json!({"a": {"b": 1, "list": [{"x": 1}]}, "empty": {}});
    let paths: Vec<String> = all_paths(&tree).iter().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["a", "a.b", "a.list", "empty"]);
}

#[test]
fn test_searchable_paths_enter_mapping_items() {
    let tree = json!({"accounts": [{"name": "x"}, "scalar"], "b": 1});
    let paths: Vec<String> = searchable_paths(&tree)
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(paths, ["accounts", "accounts[0].name", "b"]);
}

#[test]
fn test_fields_treat_sequences_as_one_value() {
    let tree = json!({"a": {"b": 1}, "ports": [80, 443], "none": {}, "nil": null});
    let fields: Vec<(String, serde_json::Value)> = fields(&tree)
        .into_iter()
        .map(|(path, value)| (path.to_string(), value.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("a.b".to_string(), json!(1)),
            ("ports".to_string(), json!([80, 443])),
            ("nil".to_string(), json!(null)),
        ]
    );
}

#[test]
fn test_count_fields() {
    let value = json!({"a": 1, "b": {"c": 2, "d": 3}, "e": [1, 2], "f": [{"g": 1}]});
    assert_eq!(count_fields(&value), 5);
    assert_eq!(count_fields(&json!("scalar")), 0);
    assert_eq!(count_fields(&json!([1, 2])), 0);
}

#[test]
fn test_max_depth() {
    assert_eq!(max_depth(&json!(1)), 0);
    assert_eq!(max_depth(&json!({"a": {"b": [1]}})), 3);
}

// =============================================================================
// Kinds
// =============================================================================

#[test]
fn test_value_kind_distinguishes_numbers() {
    assert_eq!(ValueKind::of(&json!(30)), ValueKind::Integer);
    assert_eq!(ValueKind::of(&json!(0.5)), ValueKind::Float);
    assert_eq!(ValueKind::of(&json!({})), ValueKind::Mapping);
    assert_eq!(ValueKind::Sequence.to_string(), "sequence");
}

#[test]
fn test_deep_equal_ignores_number_representation_and_key_order() {
    assert!(deep_equal(&json!({"a": 30, "b": [1]}), &json!({"b": [1], "a": 30.0})));
    assert!(!deep_equal(&json!({"a": 30}), &json!({"a": 31})));
    assert!(!deep_equal(&json!([1, 2]), &json!([1])));
    assert!(!deep_equal(&json!("1"), &json!(1)));
}
