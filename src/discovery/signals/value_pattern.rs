//! Value-pattern compatibility.

use super::{CandidateSignal, Orphan, SearchSpace, SignalError};
use crate::config::{DiscoverySettings, ValueWeights};
use crate::discovery::similarity::jaccard;
use crate::discovery::types::MigrationCandidate;
use crate::tree::ValueKind;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

/// Magnitude below which a number counts as small.
const SMALL_NUMBER: f64 = 100.0;

/// Leading sequence items compared by kind.
const LEADING_ITEMS: usize = 3;

/// Score for same-kind values with nothing finer to compare.
const SAME_KIND_SCORE: f64 = 0.6;

/// Compares the shape of the orphaned value with each template value.
#[derive(Debug, Clone)]
pub struct ValuePatternSignal {
    threshold: f64,
    review_below: f64,
    weights: ValueWeights,
    identifier: Regex,
    domain: Regex,
    uuid: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthBucket {
    Short,
    Medium,
    Long,
}

/// Coarse description of a value used for comparison.
#[derive(Debug, Clone, PartialEq)]
enum Signature {
    Text {
        flags: [bool; 5],
        bucket: LengthBucket,
        len: usize,
    },
    Bool(bool),
    Number { small: bool },
    Mapping(BTreeSet<String>),
    Sequence { len: usize, leading: Vec<ValueKind> },
    Null,
}

impl ValuePatternSignal {
    pub const NAME: &'static str = "value_pattern";

    pub fn new(settings: &DiscoverySettings) -> Result<Self, SignalError> {
        Ok(Self {
            threshold: settings.value_pattern_threshold,
            review_below: settings.value_pattern_review_below,
            weights: settings.value_weights,
            identifier: Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$")?,
            domain: Regex::new(r"\.[a-z]{2,}")?,
            uuid: Regex::new(
                r"(?i)[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
            )?,
        })
    }

    fn signature(&self, value: &Value) -> Signature {
        match value {
            Value::String(s) => {
                let len = s.chars().count();
                let bucket = match len {
                    0..10 => LengthBucket::Short,
                    10..30 => LengthBucket::Medium,
                    _ => LengthBucket::Long,
                };
                Signature::Text {
                    flags: [
                        self.identifier.is_match(s),
                        s.contains('-'),
                        s.chars().any(|c| c.is_ascii_digit()),
                        self.domain.is_match(s),
                        self.uuid.is_match(s),
                    ],
                    bucket,
                    len,
                }
            }
            Value::Bool(b) => Signature::Bool(*b),
            Value::Number(n) => Signature::Number {
                small: n.as_f64().is_some_and(|f| f.abs() < SMALL_NUMBER),
            },
            Value::Object(map) => Signature::Mapping(map.keys().cloned().collect()),
            Value::Array(items) => Signature::Sequence {
                len: items.len(),
                leading: items.iter().take(LEADING_ITEMS).map(ValueKind::of).collect(),
            },
            Value::Null => Signature::Null,
        }
    }

    /// Compatibility of two signatures in [0, 1]; different kinds score 0.
    fn compatibility(&self, a: &Signature, b: &Signature) -> f64 {
        match (a, b) {
            (
                Signature::Text {
                    flags: fa,
                    bucket: ba,
                    len: la,
                },
                Signature::Text {
                    flags: fb,
                    bucket: bb,
                    len: lb,
                },
            ) => {
                let agreeing = fa.iter().zip(fb).filter(|(x, y)| x == y).count()
                    + usize::from(ba == bb);
                let pattern = agreeing as f64 / (fa.len() + 1) as f64;
                let pattern_score = pattern * self.weights.pattern;
                pattern_score + length_similarity(*la, *lb) * self.weights.length
            }
            (Signature::Bool(x), Signature::Bool(y)) => {
                if x == y {
                    1.0
                } else {
                    0.5
                }
            }
            (Signature::Number { small: x }, Signature::Number { small: y }) => {
                if x == y {
                    SAME_KIND_SCORE
                } else {
                    0.5
                }
            }
            (Signature::Mapping(x), Signature::Mapping(y)) => jaccard(x, y),
            (
                Signature::Sequence {
                    len: la,
                    leading: ka,
                },
                Signature::Sequence {
                    len: lb,
                    leading: kb,
                },
            ) => {
                let compared = ka.len().max(kb.len());
                let kinds = if compared == 0 {
                    1.0
                } else {
                    ka.iter().zip(kb).filter(|(x, y)| x == y).count() as f64 / compared as f64
                };
                kinds * self.weights.pattern + length_similarity(*la, *lb) * self.weights.length
            }
            (Signature::Null, Signature::Null) => SAME_KIND_SCORE,
            _ => 0.0,
        }
    }
}

fn length_similarity(a: usize, b: usize) -> f64 {
    1.0 - a.abs_diff(b) as f64 / a.max(b).max(1) as f64
}

impl CandidateSignal for ValuePatternSignal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn candidates(
        &self,
        orphan: Orphan<'_>,
        space: &SearchSpace<'_>,
    ) -> Result<Vec<MigrationCandidate>, SignalError> {
        let old = self.signature(orphan.value);
        let kind = ValueKind::of(orphan.value);

        let mut out = Vec::new();
        for path in space.paths() {
            let new = self.signature(space.value(path)?);
            let score = self.compatibility(&old, &new);
            if score <= self.threshold {
                continue;
            }
            out.push(MigrationCandidate {
                new_path: path.clone(),
                signal: Self::NAME,
                score,
                evidence: format!("Value compatibility: {:.2} (type: {})", score, kind),
                requires_review: score < self.review_below,
                field_mapping: None,
            });
        }
        Ok(out)
    }
}
