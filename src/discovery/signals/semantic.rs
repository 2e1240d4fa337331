//! Semantic-domain similarity.
//!
//! Paths are classified into configuration domains (service accounts,
//! networking, storage, ...) by keyword and context-pattern scoring. Two
//! paths in the same domain are scored by how many domain keywords and
//! ancestor keys they share.

use super::{CandidateSignal, Orphan, SearchSpace, SignalError};
use crate::config::{DiscoverySettings, SemanticWeights};
use crate::discovery::similarity::jaccard;
use crate::discovery::types::MigrationCandidate;
use crate::tree::{Segment, TreePath};
use regex::Regex;
use std::collections::BTreeSet;

/// Keywords per domain, in classification priority order.
const DOMAINS: &[(&str, &[&str])] = &[
    (
        "service_account",
        &[
            "serviceaccount",
            "account",
            "service",
            "auth",
            "identity",
            "authentication",
            "authorization",
            "sa",
            "principal",
        ],
    ),
    (
        "network",
        &[
            "network",
            "service",
            "ingress",
            "egress",
            "connectivity",
            "endpoint",
            "port",
            "ip",
            "dns",
            "proxy",
            "gateway",
            "load",
            "balancer",
            "traffic",
            "route",
        ],
    ),
    (
        "storage",
        &[
            "storage",
            "volume",
            "disk",
            "pvc",
            "persistent",
            "mount",
            "filesystem",
            "backup",
            "snapshot",
        ],
    ),
    (
        "security",
        &[
            "security",
            "tls",
            "ssl",
            "cert",
            "certificate",
            "secret",
            "key",
            "token",
            "encryption",
            "cipher",
            "crypto",
        ],
    ),
    (
        "resource",
        &[
            "resource",
            "cpu",
            "memory",
            "limit",
            "request",
            "quota",
            "allocation",
            "usage",
            "capacity",
        ],
    ),
    (
        "monitoring",
        &[
            "monitor",
            "metric",
            "prometheus",
            "alert",
            "health",
            "status",
            "log",
            "trace",
            "debug",
        ],
    ),
    (
        "database",
        &[
            "database",
            "db",
            "sql",
            "mysql",
            "ndb",
            "cluster",
            "replication",
            "backup",
            "restore",
            "schema",
        ],
    ),
    (
        "container",
        &[
            "container",
            "image",
            "pod",
            "deployment",
            "replica",
            "docker",
            "registry",
            "tag",
            "pull",
        ],
    ),
    ("annotation", &["annotation", "label", "metadata", "tag", "mark"]),
    (
        "configuration",
        &[
            "config",
            "setting",
            "parameter",
            "option",
            "value",
            "property",
            "attribute",
            "feature",
            "flag",
        ],
    ),
];

/// Context patterns that identify a domain more reliably than keywords.
/// Each match is worth two keyword hits.
const CONTEXT_PATTERNS: &[(&str, &[&str])] = &[
    (
        "service_account",
        &[
            r"serviceaccount.*(?:create|name)",
            r"(?:create|name).*serviceaccount",
            r"account.*(?:upgrade|multus|app)",
            r"auth.*(?:token|principal)",
        ],
    ),
    (
        "network",
        &[
            r"service.*(?:labels|annotations|type)",
            r"connectivity.*service",
            r"external.*(?:service|connectivity)",
            r"load.*balancer",
            r"ingress|egress",
        ],
    ),
    (
        "database",
        &[
            r"(?:mysql|ndb).*(?:host|port|user)",
            r"replication.*(?:service|host)",
            r"backup.*(?:manager|executor)",
            r"db.*(?:tier|monitor)",
        ],
    ),
];

const CONTEXT_WEIGHT: usize = 2;

/// Compiled domain classifier.
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    keywords: Vec<(&'static str, Regex)>,
    context: Vec<(&'static str, Regex)>,
}

impl DomainClassifier {
    pub fn new() -> Result<Self, SignalError> {
        let keywords = DOMAINS
            .iter()
            .map(|(domain, words)| -> Result<_, SignalError> {
                let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
                let pattern = format!(r"\b(?:{})\b", alternation.join("|"));
                Ok((*domain, Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>, SignalError>>()?;

        let context = CONTEXT_PATTERNS
            .iter()
            .flat_map(|(domain, patterns)| patterns.iter().map(move |p| (*domain, *p)))
            .map(|(domain, pattern)| -> Result<_, SignalError> {
                Ok((domain, Regex::new(pattern)?))
            })
            .collect::<Result<Vec<_>, SignalError>>()?;

        Ok(Self { keywords, context })
    }

    /// The best-scoring domain for a path, if any keyword or pattern hits.
    ///
    /// Ties go to the domain that scored first: context patterns are tried
    /// before keywords.
    pub fn classify(&self, path: &TreePath) -> Option<&'static str> {
        let text = path.to_string().to_lowercase();
        let mut scores: Vec<(&'static str, usize)> = Vec::new();
        let mut add = |domain: &'static str, points: usize| {
            match scores.iter_mut().find(|(d, _)| *d == domain) {
                Some((_, score)) => *score += points,
                None => scores.push((domain, points)),
            }
        };

        for (domain, pattern) in &self.context {
            if pattern.is_match(&text) {
                add(*domain, CONTEXT_WEIGHT);
            }
        }
        for (domain, pattern) in &self.keywords {
            let hits = pattern.find_iter(&text).count();
            if hits > 0 {
                add(*domain, hits);
            }
        }

        let mut best: Option<(&'static str, usize)> = None;
        for (domain, score) in scores {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((domain, score));
            }
        }
        best.map(|(domain, _)| domain)
    }
}

/// Domain keywords appearing anywhere in the lowercased path.
fn domain_keywords(path_lower: &str, domain: &str) -> BTreeSet<&'static str> {
    DOMAINS
        .iter()
        .find(|(name, _)| *name == domain)
        .map(|(_, words)| {
            words
                .iter()
                .copied()
                .filter(|word| path_lower.contains(word))
                .collect()
        })
        .unwrap_or_default()
}

/// Keys of every segment but the last.
fn ancestor_keys(path: &TreePath) -> BTreeSet<&str> {
    let segments = path.segments();
    segments[..segments.len().saturating_sub(1)]
        .iter()
        .filter_map(Segment::as_key)
        .collect()
}

/// Proposes template paths that belong to the orphan's domain.
#[derive(Debug, Clone)]
pub struct SemanticSignal {
    review_below: f64,
    weights: SemanticWeights,
    classifier: DomainClassifier,
}

impl SemanticSignal {
    pub const NAME: &'static str = "semantic_context";

    pub fn new(settings: &DiscoverySettings) -> Result<Self, SignalError> {
        Ok(Self {
            review_below: settings.semantic_review_below,
            weights: settings.semantic_weights,
            classifier: DomainClassifier::new()?,
        })
    }

    /// Similarity of two paths already known to share `domain`.
    fn similarity(&self, old: &TreePath, new: &TreePath, domain: &str) -> f64 {
        let mut score = self.weights.base;

        let old_words = domain_keywords(&old.to_string().to_lowercase(), domain);
        let new_words = domain_keywords(&new.to_string().to_lowercase(), domain);
        if !old_words.is_empty() && !new_words.is_empty() {
            score += jaccard(&old_words, &new_words) * self.weights.keywords;
        }

        let old_parents = ancestor_keys(old);
        let new_parents = ancestor_keys(new);
        if !old_parents.is_empty() && !new_parents.is_empty() {
            score += jaccard(&old_parents, &new_parents) * self.weights.context;
        }

        score.min(1.0)
    }
}

impl CandidateSignal for SemanticSignal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn candidates(
        &self,
        orphan: Orphan<'_>,
        space: &SearchSpace<'_>,
    ) -> Result<Vec<MigrationCandidate>, SignalError> {
        let Some(domain) = self.classifier.classify(orphan.path) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for path in space.paths() {
            if self.classifier.classify(path) != Some(domain) {
                continue;
            }
            let score = self.similarity(orphan.path, path, domain);
            out.push(MigrationCandidate {
                new_path: path.clone(),
                signal: Self::NAME,
                score,
                evidence: format!("Semantic domain: '{}', Similarity: {:.2}", domain, score),
                requires_review: score < self.review_below,
                field_mapping: None,
            });
        }
        Ok(out)
    }
}
