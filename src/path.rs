//! File path addressing
//!
//! A `FilePath` is an immutable chain of name segments, root to leaf. Clones
//! share the segment buffer, so a path handed to the store as a key can never
//! be mutated behind the store's back. `copy()` produces a fully independent
//! buffer for callers that want one.

use crate::error::PathError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Separator used when rendering a path.
pub const SEPARATOR: char = '/';

/// Immutable, cheaply cloneable path of name segments.
///
/// Equality, ordering and hashing are exact and segment-wise. Use a
/// [`PathComparer`](crate::comparer::PathComparer) for any other notion of
/// equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath {
    segments: Arc<[String]>,
}

impl FilePath {
    /// Create a path named `name` under `parent`, or a root path when `parent` is `None`.
    ///
    /// `name` is taken as is. A name that is empty or contains a separator
    /// renders to a string that parses back to a different path; use
    /// [`FilePath::try_new`] for names from untrusted input.
    pub fn new(name: impl Into<String>, parent: Option<&FilePath>) -> Self {
        let name = name.into();
        let segments: Vec<String> = match parent {
            Some(parent) => parent
                .segments
                .iter()
                .cloned()
                .chain(std::iter::once(name))
                .collect(),
            None => vec![name],
        };
        Self {
            segments: segments.into(),
        }
    }

    /// Like [`FilePath::new`], but rejects names that would not survive a
    /// display/parse round trip.
    pub fn try_new(name: impl Into<String>, parent: Option<&FilePath>) -> Result<Self, PathError> {
        let name = name.into();
        check_segment(&name)?;
        Ok(Self::new(name, parent))
    }

    /// Create a single-segment root path.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Parse a path string. Both `/` and `\` separate segments; empty
    /// segments (leading, trailing or doubled separators) are dropped.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let segments: Vec<String> = s
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(PathError::Empty(s.to_string()));
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    /// Build a path from owned segments. Fails when `segments` is empty or
    /// any segment is not a valid name.
    pub fn from_segments(segments: Vec<String>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty(String::new()));
        }
        for segment in &segments {
            check_segment(segment)?;
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    /// Path of a direct child of this path.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::new(name, Some(self))
    }

    /// Append several segments at once.
    #[must_use]
    pub fn join_segments<S: AsRef<str>>(&self, tail: &[S]) -> Self {
        let segments: Vec<String> = self
            .segments
            .iter()
            .cloned()
            .chain(tail.iter().map(|s| s.as_ref().to_string()))
            .collect();
        Self {
            segments: segments.into(),
        }
    }

    /// The parent path, or `None` for a root path.
    pub fn parent(&self) -> Option<FilePath> {
        self.prefix(self.segments.len() - 1)
    }

    /// The first `len` segments as a path. `None` when `len` is zero or
    /// longer than this path.
    pub fn prefix(&self, len: usize) -> Option<FilePath> {
        if len == 0 || len > self.segments.len() {
            return None;
        }
        if len == self.segments.len() {
            return Some(self.clone());
        }
        Some(Self {
            segments: self.segments[..len].to_vec().into(),
        })
    }

    /// Deep copy with its own segment buffer.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            segments: self.segments.iter().cloned().collect::<Vec<_>>().into(),
        }
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        // a FilePath always holds at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (depth, with a root path at depth 1).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when this path has no parent.
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn is_ancestor_of(&self, other: &FilePath) -> bool {
        other.starts_with(self)
    }

    /// True when `prefix` equals this path or is one of its ancestors.
    pub fn starts_with(&self, prefix: &FilePath) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix.segments[..] == self.segments[..prefix.segments.len()]
    }

    /// Nearest common ancestor of two paths (the overlap path), using exact
    /// segment comparison. `None` when the paths share no root.
    pub fn common_ancestor(&self, other: &FilePath) -> Option<FilePath> {
        let shared = self
            .segments
            .iter()
            .zip(other.segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.prefix(shared)
    }

    /// Replace the first `prefix_len` segments with `new_prefix`.
    #[must_use]
    pub fn reparent(&self, prefix_len: usize, new_prefix: &FilePath) -> FilePath {
        let tail = &self.segments[prefix_len.min(self.segments.len())..];
        new_prefix.join_segments(tail)
    }

    /// Substitute the `from` prefix with `to`. `None` when `from` is not a prefix.
    pub fn rebase(&self, from: &FilePath, to: &FilePath) -> Option<FilePath> {
        if !self.starts_with(from) {
            return None;
        }
        Some(self.reparent(from.len(), to))
    }
}

fn check_segment(name: &str) -> Result<(), PathError> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(PathError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilePath({:?})", self.to_string())
    }
}

impl FromStr for FilePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FilePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FilePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FilePath::parse(&s).map_err(serde::de::Error::custom)
    }
}
