//! Configuration tree model for config-migrator.
//!
//! A configuration tree is a `serde_json::Value` whose mappings keep their
//! insertion order. Paths into a tree are parsed once into [`TreePath`] and
//! every operation here works on segments, never on path strings.

mod kind;
mod ops;
mod path;

#[cfg(test)]
mod tests;

pub use kind::ValueKind;
pub use ops::{
    all_paths, count_fields, deep_equal, exists, fields, get, max_depth, remove, remove_and_prune,
    searchable_paths, set,
};
pub use path::{Segment, TreePath};

/// A loaded configuration tree.
pub type ConfigTree = serde_json::Value;

/// Parse a path, panicking on bad syntax. Test helper.
#[cfg(test)]
pub(crate) fn p(path: &str) -> TreePath {
    TreePath::parse(path).unwrap()
}
