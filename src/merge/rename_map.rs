//! Path rename maps.
//!
//! A rename map tells the merge engine that a customization recorded at an
//! old path should be applied at a different path in the new template. Maps
//! come from the user (a JSON file) or from candidate discovery, and are
//! validated before any merge runs.

use crate::error::{MigrateError, Result};
use crate::tree::TreePath;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Key for the enveloped file form: `{"migrations": {old: new}}`.
const ENVELOPE_KEY: &str = "migrations";

/// Validated old-path to new-path renames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameMap {
    renames: BTreeMap<TreePath, TreePath>,
    /// Key renames to apply inside mapping values moved by a rename.
    field_renames: BTreeMap<TreePath, BTreeMap<String, String>>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a map from a JSON file, flat or enveloped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MigrateError::Input(format!(
                "failed to read rename map '{}': {}",
                path.display(),
                e
            ))
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| MigrateError::Parse(format!("rename map '{}': {}", path.display(), e)))?;
        Self::from_json(&value)
    }

    /// Build a map from its JSON form, flat or enveloped.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = match value {
            Value::Object(map) => match map.get(ENVELOPE_KEY) {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(MigrateError::InvalidRenameMap(vec![format!(
                        "'{}' must be an object of path to path",
                        ENVELOPE_KEY
                    )]));
                }
                None => map,
            },
            _ => {
                return Err(MigrateError::InvalidRenameMap(vec![
                    "rename map must be a JSON object".to_string(),
                ]));
            }
        };

        let mut raw = Vec::with_capacity(object.len());
        let mut errors = Vec::new();
        for (old, new) in object {
            match new {
                Value::String(new) => raw.push((old.clone(), new.clone())),
                other => errors.push(format!(
                    "Invalid path format: target of '{}' must be a string, found {}",
                    old, other
                )),
            }
        }

        match Self::from_pairs(raw) {
            Ok(map) if errors.is_empty() => Ok(map),
            Ok(_) => Err(MigrateError::InvalidRenameMap(errors)),
            Err(MigrateError::InvalidRenameMap(more)) => {
                errors.extend(more);
                Err(MigrateError::InvalidRenameMap(errors))
            }
            Err(other) => Err(other),
        }
    }

    /// Build and validate a map from raw path strings.
    ///
    /// Every malformed path and every rename cycle is reported together.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut renames = BTreeMap::new();
        let mut errors = Vec::new();

        for (old, new) in pairs {
            let (old, new) = (old.as_ref(), new.as_ref());
            match (parse_entry(old), parse_entry(new)) {
                (Ok(old), Ok(new)) => {
                    renames.insert(old, new);
                }
                (old_result, new_result) => {
                    errors.extend(old_result.err());
                    errors.extend(new_result.err());
                }
            }
        }

        errors.extend(find_cycles(&renames));
        if !errors.is_empty() {
            return Err(MigrateError::InvalidRenameMap(errors));
        }

        Ok(Self {
            renames,
            field_renames: BTreeMap::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// The target for `old`, if it is renamed.
    pub fn target(&self, old: &TreePath) -> Option<&TreePath> {
        self.renames.get(old)
    }

    /// Key renames to apply to a mapping value moved away from `old`.
    pub fn field_renames(&self, old: &TreePath) -> Option<&BTreeMap<String, String>> {
        self.field_renames.get(old)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &TreePath)> {
        self.renames.iter()
    }

    /// Add one rename unless it would close a cycle.
    ///
    /// Returns `false` (leaving the map unchanged) when `old` already has a
    /// target or the rename would make a chain loop back on itself.
    pub fn try_insert(
        &mut self,
        old: TreePath,
        new: TreePath,
        field_renames: BTreeMap<String, String>,
    ) -> bool {
        if self.renames.contains_key(&old) {
            return false;
        }
        self.renames.insert(old.clone(), new);
        if !find_cycles(&self.renames).is_empty() {
            self.renames.remove(&old);
            return false;
        }
        if !field_renames.is_empty() {
            self.field_renames.insert(old, field_renames);
        }
        true
    }

    /// Layer `lower` beneath this map: entries already present here win, and
    /// entries from `lower` that would introduce a cycle are dropped.
    ///
    /// Returns the old paths that were dropped.
    pub fn layer_under(&mut self, lower: &RenameMap) -> Vec<TreePath> {
        let mut dropped = Vec::new();
        for (old, new) in &lower.renames {
            if self.renames.contains_key(old) {
                continue;
            }
            let fields = lower.field_renames.get(old).cloned().unwrap_or_default();
            if !self.try_insert(old.clone(), new.clone(), fields) {
                dropped.push(old.clone());
            }
        }
        dropped
    }

    /// The map as `{old: new}` JSON, in the enveloped file form.
    pub fn to_json(&self) -> Value {
        let migrations: serde_json::Map<String, Value> = self
            .renames
            .iter()
            .map(|(old, new)| (old.to_string(), Value::String(new.to_string())))
            .collect();
        let mut envelope = serde_json::Map::new();
        envelope.insert(ENVELOPE_KEY.to_string(), Value::Object(migrations));
        Value::Object(envelope)
    }
}

fn parse_entry(raw: &str) -> std::result::Result<TreePath, String> {
    TreePath::parse(raw).map_err(|e| match e {
        MigrateError::InvalidPath { reason, .. } => {
            format!("Invalid path format: '{}' ({})", raw, reason)
        }
        other => other.to_string(),
    })
}

/// Walk every rename chain and report each loop once.
fn find_cycles(renames: &BTreeMap<TreePath, TreePath>) -> Vec<String> {
    let mut errors = Vec::new();
    let mut reported: Vec<Vec<&TreePath>> = Vec::new();

    for start in renames.keys() {
        let mut chain = vec![start];
        let mut current = start;
        while let Some(next) = renames.get(current) {
            if let Some(pos) = chain.iter().position(|p| *p == next) {
                let mut cycle: Vec<&TreePath> = chain[pos..].to_vec();
                cycle.sort();
                if !reported.contains(&cycle) {
                    let rendered: Vec<String> = chain.iter().map(|p| p.to_string()).collect();
                    errors.push(format!(
                        "Circular migration detected: {} -> {}",
                        rendered.join(" -> "),
                        next
                    ));
                    reported.push(cycle);
                }
                break;
            }
            chain.push(next);
            current = next;
        }
    }

    errors
}
