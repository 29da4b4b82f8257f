//! Path comparison strategies
//!
//! The store never compares paths with `==` directly. Every segment goes
//! through a [`PathComparer`], which maps it to the key it is hashed and
//! compared by. The default is exact, case-sensitive matching.

use crate::path::FilePath;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Key-equality strategy over `FilePath` segments.
pub trait PathComparer {
    /// The form of `segment` used for hashing and equality.
    fn segment_key<'a>(&self, segment: &'a str) -> Cow<'a, str>;

    fn segments_eq(&self, a: &str, b: &str) -> bool {
        self.segment_key(a) == self.segment_key(b)
    }

    fn paths_eq(&self, a: &FilePath, b: &FilePath) -> bool {
        a.len() == b.len() && self.common_prefix_len(a, b) == a.len()
    }

    /// True when `prefix` equals `path` or is one of its ancestors.
    fn is_prefix(&self, prefix: &FilePath, path: &FilePath) -> bool {
        prefix.len() <= path.len() && self.common_prefix_len(prefix, path) == prefix.len()
    }

    /// Number of leading segments the two paths share.
    fn common_prefix_len(&self, a: &FilePath, b: &FilePath) -> usize {
        a.segments()
            .iter()
            .zip(b.segments())
            .take_while(|(x, y)| self.segments_eq(x, y))
            .count()
    }

    /// Nearest common ancestor under this comparer.
    fn common_ancestor(&self, a: &FilePath, b: &FilePath) -> Option<FilePath> {
        a.prefix(self.common_prefix_len(a, b))
    }

    /// Canonical form of `path`: equal under this comparer iff the canonical
    /// forms are exactly equal, so it can key an ordinary `HashMap`.
    fn canonical(&self, path: &FilePath) -> FilePath {
        let segments = path
            .segments()
            .iter()
            .map(|s| self.segment_key(s).into_owned())
            .collect();
        // path is non-empty, so the canonical form is too
        FilePath::from_segments(segments).unwrap_or_else(|_| path.clone())
    }

    fn path_hash<H: Hasher>(&self, path: &FilePath, state: &mut H) {
        path.len().hash(state);
        for segment in path.segments() {
            self.segment_key(segment).hash(state);
        }
    }
}

/// Exact, case-sensitive segment matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactComparer;

impl PathComparer for ExactComparer {
    fn segment_key<'a>(&self, segment: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(segment)
    }

    fn segments_eq(&self, a: &str, b: &str) -> bool {
        a == b
    }
}

/// Case-insensitive matching via Unicode lower-case folding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseInsensitiveComparer;

impl PathComparer for CaseInsensitiveComparer {
    fn segment_key<'a>(&self, segment: &'a str) -> Cow<'a, str> {
        if segment.chars().any(char::is_uppercase) {
            Cow::Owned(segment.to_lowercase())
        } else {
            Cow::Borrowed(segment)
        }
    }
}

/// Case-sensitive matching after Unicode NFC normalization, so composed and
/// decomposed spellings of the same name compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NfcComparer;

impl PathComparer for NfcComparer {
    fn segment_key<'a>(&self, segment: &'a str) -> Cow<'a, str> {
        match is_nfc_quick(segment.chars()) {
            IsNormalized::Yes => Cow::Borrowed(segment),
            _ => Cow::Owned(segment.nfc().collect()),
        }
    }
}

/// Comparison mode selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Exact,
    CaseInsensitive,
    Nfc,
}

/// Comparer chosen at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfiguredComparer {
    mode: Comparison,
}

impl ConfiguredComparer {
    pub fn new(mode: Comparison) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Comparison {
        self.mode
    }
}

impl From<Comparison> for ConfiguredComparer {
    fn from(mode: Comparison) -> Self {
        Self::new(mode)
    }
}

impl PathComparer for ConfiguredComparer {
    fn segment_key<'a>(&self, segment: &'a str) -> Cow<'a, str> {
        match self.mode {
            Comparison::Exact => ExactComparer.segment_key(segment),
            Comparison::CaseInsensitive => CaseInsensitiveComparer.segment_key(segment),
            Comparison::Nfc => NfcComparer.segment_key(segment),
        }
    }
}
