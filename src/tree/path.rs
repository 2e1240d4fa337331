//! Parsed configuration paths.
//!
//! A path string such as `global.accounts[0].name` is parsed once into a
//! list of segments. Keys that contain separators are written in quoted
//! bracket form: `annotations["example.com/owner"]`.

use crate::error::{MigrateError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step in a path: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// The key name, if this is a mapping segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// A location within one configuration tree.
///
/// The empty path addresses the root. Ordering is segment-wise, which keeps
/// sorted path sets grouped by subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    segments: Vec<Segment>,
}

impl TreePath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parse a path string, rejecting empty paths, stray or doubled
    /// separators and malformed indices.
    pub fn parse(input: &str) -> Result<Self> {
        parse_path(input)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments. Sequence indices count as segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when any segment is a sequence index.
    pub fn has_index(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Index(_)))
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Extend with a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Self { segments }
    }

    /// Extend with a sequence index.
    pub fn index(&self, idx: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(idx));
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The nearest mapping key at or above the final segment.
    ///
    /// For `ports[1]` this is `ports`; for `a.b` it is `b`.
    pub fn field_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(Segment::as_key)
    }

    /// Only the mapping-key segments, in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.segments.iter().filter_map(Segment::as_key)
    }

    /// True when `self` equals `ancestor` or lies beneath it.
    pub fn starts_with(&self, ancestor: &TreePath) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }

    /// True when `self` lies strictly beneath `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &TreePath) -> bool {
        self.segments.len() > ancestor.segments.len() && self.starts_with(ancestor)
    }

    /// Number of leading segments shared with `other`.
    pub fn common_prefix_len(&self, other: &TreePath) -> usize {
        self.segments
            .iter()
            .zip(&other.segments)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// The longest shared ancestor of `self` and `other`.
    pub fn common_prefix(&self, other: &TreePath) -> TreePath {
        let len = self.common_prefix_len(other);
        Self {
            segments: self.segments[..len].to_vec(),
        }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if needs_quoting(key) => {
                    write!(f, "[\"{}\"]", key.replace('\\', "\\\\").replace('"', "\\\""))?
                }
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        parse_path(s)
    }
}

impl Serialize for TreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TreePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_path(&raw).map_err(serde::de::Error::custom)
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

fn parse_path(input: &str) -> Result<TreePath> {
    if input.is_empty() {
        return Err(MigrateError::invalid_path(input, "path is empty"));
    }
    if input.starts_with('.') {
        return Err(MigrateError::invalid_path(input, "leading separator"));
    }

    let mut segments = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let (segment, remaining) = parse_bracket(input, after)?;
            segments.push(segment);
            rest = remaining;
            continue;
        }

        let body = match rest.strip_prefix('.') {
            Some(after) => after,
            None if segments.is_empty() => rest,
            None => {
                return Err(MigrateError::invalid_path(
                    input,
                    "expected '.' or '[' after a segment",
                ));
            }
        };

        let end = body.find(['.', '[', ']']).unwrap_or(body.len());
        if end == 0 {
            let reason = if body.is_empty() {
                "trailing separator"
            } else if body.starts_with('.') {
                "doubled separator"
            } else {
                "separator must be followed by a key"
            };
            return Err(MigrateError::invalid_path(input, reason));
        }
        if body[end..].starts_with(']') {
            return Err(MigrateError::invalid_path(input, "unmatched ']'"));
        }
        segments.push(Segment::Key(body[..end].to_string()));
        rest = &body[end..];
    }

    Ok(TreePath { segments })
}

/// Parse the inside of `[...]`, returning the segment and the text after `]`.
fn parse_bracket<'a>(input: &str, after: &'a str) -> Result<(Segment, &'a str)> {
    if let Some(quoted) = after.strip_prefix('"') {
        let mut key = String::new();
        let mut chars = quoted.char_indices();
        while let Some((pos, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => break,
                },
                '"' => {
                    let tail = &quoted[pos + 1..];
                    return match tail.strip_prefix(']') {
                        Some(remaining) => Ok((Segment::Key(key), remaining)),
                        None => Err(MigrateError::invalid_path(input, "expected ']' after quoted key")),
                    };
                }
                _ => key.push(c),
            }
        }
        return Err(MigrateError::invalid_path(input, "unterminated quoted key"));
    }

    let close = after
        .find(']')
        .ok_or_else(|| MigrateError::invalid_path(input, "unmatched '['"))?;
    let digits = &after[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MigrateError::invalid_path(
            input,
            format!("index '{}' must be a non-negative integer", digits),
        ));
    }
    let idx = digits
        .parse::<usize>()
        .map_err(|e| MigrateError::invalid_path(input, format!("index out of range: {}", e)))?;
    Ok((Segment::Index(idx), &after[close + 1..]))
}
