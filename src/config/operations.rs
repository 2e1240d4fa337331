//! Settings loading and validation.

use super::model::Settings;
use crate::error::{MigrateError, Result};
use std::path::Path;

/// Tolerance for weight groups that must sum to 1.
const WEIGHT_TOLERANCE: f64 = 1e-6;

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Successfully loaded and validated settings
    /// * `Err(MigrateError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            MigrateError::Config(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load settings from `path` when given, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| MigrateError::Config(format!("failed to parse settings YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MigrateError::Config(format!("failed to serialize settings: {}", e)))
    }

    /// Validate settings values.
    ///
    /// Validation rules:
    /// - every threshold, ratio and weight lies in [0, 1]
    /// - `auto_apply_threshold` is strictly greater than `suggest_threshold`
    /// - guidance bands ascend from low to medium to `auto_apply_threshold`
    /// - each weight group sums to 1
    /// - `min_object_fields` is at least 1
    pub fn validate(&self) -> Result<()> {
        let d = &self.discovery;

        let unit_values = [
            ("discovery.auto_apply_threshold", d.auto_apply_threshold),
            ("discovery.suggest_threshold", d.suggest_threshold),
            ("discovery.medium_confidence_threshold", d.medium_confidence_threshold),
            ("discovery.low_confidence_threshold", d.low_confidence_threshold),
            ("discovery.field_name_threshold", d.field_name_threshold),
            ("discovery.field_name_review_below", d.field_name_review_below),
            ("discovery.value_pattern_threshold", d.value_pattern_threshold),
            ("discovery.value_pattern_review_below", d.value_pattern_review_below),
            ("discovery.structural_threshold", d.structural_threshold),
            ("discovery.structural_review_below", d.structural_review_below),
            ("discovery.semantic_review_below", d.semantic_review_below),
            ("discovery.structural_weights.prefix", d.structural_weights.prefix),
            ("discovery.structural_weights.depth", d.structural_weights.depth),
            ("discovery.structural_weights.keywords", d.structural_weights.keywords),
            ("discovery.value_weights.pattern", d.value_weights.pattern),
            ("discovery.value_weights.length", d.value_weights.length),
            ("discovery.semantic_weights.base", d.semantic_weights.base),
            ("discovery.semantic_weights.keywords", d.semantic_weights.keywords),
            ("discovery.semantic_weights.context", d.semantic_weights.context),
            ("transform.object_move_ratio", self.transform.object_move_ratio),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(MigrateError::Config(format!(
                    "validation failed: {} must be between 0 and 1 (found {})",
                    name, value
                )));
            }
        }

        if d.auto_apply_threshold <= d.suggest_threshold {
            return Err(MigrateError::Config(format!(
                "validation failed: discovery.auto_apply_threshold ({}) must be greater than discovery.suggest_threshold ({})",
                d.auto_apply_threshold, d.suggest_threshold
            )));
        }

        if d.low_confidence_threshold > d.medium_confidence_threshold
            || d.medium_confidence_threshold > d.auto_apply_threshold
        {
            return Err(MigrateError::Config(format!(
                "validation failed: guidance bands must satisfy low_confidence_threshold ({}) <= medium_confidence_threshold ({}) <= auto_apply_threshold ({})",
                d.low_confidence_threshold, d.medium_confidence_threshold, d.auto_apply_threshold
            )));
        }

        let weight_groups = [
            (
                "discovery.structural_weights",
                d.structural_weights.prefix + d.structural_weights.depth + d.structural_weights.keywords,
            ),
            (
                "discovery.value_weights",
                d.value_weights.pattern + d.value_weights.length,
            ),
            (
                "discovery.semantic_weights",
                d.semantic_weights.base + d.semantic_weights.keywords + d.semantic_weights.context,
            ),
        ];
        for (name, sum) in weight_groups {
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(MigrateError::Config(format!(
                    "validation failed: {} must sum to 1 (found {})",
                    name, sum
                )));
            }
        }

        if self.transform.min_object_fields == 0 {
            return Err(MigrateError::Config(
                "validation failed: transform.min_object_fields must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
