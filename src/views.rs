//! Flattened views
//!
//! `Keys`, `Values` and `Pairs` present the two-tier node storage as a single
//! enumeration without materializing it. Each view can be iterated any number
//! of times; every `iter()` call starts a fresh walk. Lengths come from the
//! node's entry count, so `len()` never traverses.
//!
//! Views borrow the store, so it cannot change while one is alive. A caller
//! that needs to mutate while walking must collect first.
//!
//! Walk order: a node's own value, then its leaves, then each subtree in
//! turn. Order within one node's children is unspecified.

use crate::path::FilePath;
use crate::store::node::Leaf;
use crate::store::PathNode;
use std::collections::hash_map;
use std::iter::FusedIterator;

#[derive(Debug)]
enum Source<'a, V> {
    Node(&'a PathNode<V>),
    Single(&'a FilePath, &'a V),
    Empty,
}

impl<V> Clone for Source<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Source<'_, V> {}

impl<'a, V> Source<'a, V> {
    fn len(&self) -> usize {
        match self {
            Source::Node(node) => node.len(),
            Source::Single(..) => 1,
            Source::Empty => 0,
        }
    }

    fn iter(&self) -> PairsIter<'a, V> {
        match *self {
            Source::Node(node) => PairsIter {
                pending: vec![node],
                leaves: None,
                single: None,
                remaining: node.len(),
            },
            Source::Single(path, value) => PairsIter {
                pending: Vec::new(),
                leaves: None,
                single: Some((path, value)),
                remaining: 1,
            },
            Source::Empty => PairsIter {
                pending: Vec::new(),
                leaves: None,
                single: None,
                remaining: 0,
            },
        }
    }
}

/// View of every `(key, value)` pair in a subtree.
#[derive(Debug)]
pub struct Pairs<'a, V> {
    source: Source<'a, V>,
}

impl<V> Clone for Pairs<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Pairs<'_, V> {}

impl<'a, V> Pairs<'a, V> {
    pub(crate) fn new(node: &'a PathNode<V>) -> Self {
        Self {
            source: Source::Node(node),
        }
    }

    pub(crate) fn single(path: &'a FilePath, value: &'a V) -> Self {
        Self {
            source: Source::Single(path, value),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            source: Source::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a fresh walk.
    pub fn iter(&self) -> PairsIter<'a, V> {
        self.source.iter()
    }

    /// Key-only view over the same entries.
    pub fn keys(&self) -> Keys<'a, V> {
        Keys { pairs: *self }
    }

    /// Value-only view over the same entries.
    pub fn values(&self) -> Values<'a, V> {
        Values { pairs: *self }
    }
}

impl<'a, V> IntoIterator for Pairs<'a, V> {
    type Item = (&'a FilePath, &'a V);
    type IntoIter = PairsIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &Pairs<'a, V> {
    type Item = (&'a FilePath, &'a V);
    type IntoIter = PairsIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator behind every view.
pub struct PairsIter<'a, V> {
    pending: Vec<&'a PathNode<V>>,
    leaves: Option<hash_map::Values<'a, String, Leaf<V>>>,
    single: Option<(&'a FilePath, &'a V)>,
    remaining: usize,
}

impl<'a, V> Iterator for PairsIter<'a, V> {
    type Item = (&'a FilePath, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.single.take() {
            self.remaining = 0;
            return Some(entry);
        }
        loop {
            if let Some(leaves) = self.leaves.as_mut() {
                if let Some(leaf) = leaves.next() {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some((&leaf.path, &leaf.value));
                }
                self.leaves = None;
            }
            let node = self.pending.pop()?;
            self.pending.extend(node.subtrees.values());
            self.leaves = Some(node.leaves.values());
            if let Some(value) = node.value.as_ref() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&node.path, value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for PairsIter<'_, V> {}

impl<V> FusedIterator for PairsIter<'_, V> {}

/// View of every key in a subtree.
#[derive(Debug)]
pub struct Keys<'a, V> {
    pairs: Pairs<'a, V>,
}

impl<V> Clone for Keys<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Keys<'_, V> {}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(node: &'a PathNode<V>) -> Self {
        Self {
            pairs: Pairs::new(node),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> KeysIter<'a, V> {
        KeysIter {
            inner: self.pairs.iter(),
        }
    }

    /// True when `key` is exactly one of the keys in view.
    pub fn contains(&self, key: &FilePath) -> bool {
        self.iter().any(|k| k == key)
    }
}

impl<'a, V> IntoIterator for Keys<'a, V> {
    type Item = &'a FilePath;
    type IntoIter = KeysIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &Keys<'a, V> {
    type Item = &'a FilePath;
    type IntoIter = KeysIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct KeysIter<'a, V> {
    inner: PairsIter<'a, V>,
}

impl<'a, V> Iterator for KeysIter<'a, V> {
    type Item = &'a FilePath;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for KeysIter<'_, V> {}

impl<V> FusedIterator for KeysIter<'_, V> {}

/// View of every value in a subtree.
#[derive(Debug)]
pub struct Values<'a, V> {
    pairs: Pairs<'a, V>,
}

impl<V> Clone for Values<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Values<'_, V> {}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(node: &'a PathNode<V>) -> Self {
        Self {
            pairs: Pairs::new(node),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> ValuesIter<'a, V> {
        ValuesIter {
            inner: self.pairs.iter(),
        }
    }
}

impl<'a, V> IntoIterator for Values<'a, V> {
    type Item = &'a V;
    type IntoIter = ValuesIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &Values<'a, V> {
    type Item = &'a V;
    type IntoIter = ValuesIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ValuesIter<'a, V> {
    inner: PairsIter<'a, V>,
}

impl<'a, V> Iterator for ValuesIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesIter<'_, V> {}

impl<V> FusedIterator for ValuesIter<'_, V> {}
