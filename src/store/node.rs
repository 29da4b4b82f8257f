//! Store node
//!
//! A `PathNode` represents one path prefix. Its value lives in `value`; its
//! direct children are split between `leaves` (children with no descendants
//! of their own) and `subtrees` (children rooting a deeper subtree, which may
//! also carry a value). Both maps are keyed by the comparer's segment key.
//!
//! `count` is the number of values anywhere in the subtree. Every mutating
//! routine returns how many entries it added or removed and each level applies
//! that delta once, on the way back up.

use crate::comparer::PathComparer;
use crate::error::StoreError;
use crate::observer::ChangeObserver;
use crate::path::FilePath;
use crate::views::{Keys, Pairs};
use std::collections::HashMap;
use tracing::{debug, trace};

/// A value stored at a path with no descendants.
#[derive(Debug, Clone)]
pub(crate) struct Leaf<V> {
    pub(crate) path: FilePath,
    pub(crate) value: V,
}

/// One node of the path-indexed store.
#[derive(Debug, Clone)]
pub struct PathNode<V> {
    pub(crate) path: FilePath,
    pub(crate) value: Option<V>,
    pub(crate) leaves: HashMap<String, Leaf<V>>,
    pub(crate) subtrees: HashMap<String, PathNode<V>>,
    pub(crate) count: usize,
}

/// Where a key lives inside a node.
pub(crate) enum Located<'a, V> {
    Leaf(&'a Leaf<V>),
    Node(&'a PathNode<V>),
}

/// An entry or subtree taken out of the store during a relocation.
pub(crate) enum Detached<V> {
    Leaf(Leaf<V>),
    Node(PathNode<V>),
}

impl<V> Detached<V> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Detached::Leaf(_) => 1,
            Detached::Node(node) => node.count,
        }
    }

    /// Every entry, descendants before the subtree root's own value.
    pub(crate) fn into_entries(self) -> Vec<(FilePath, V)> {
        let mut out = Vec::with_capacity(self.len());
        match self {
            Detached::Leaf(leaf) => out.push((leaf.path, leaf.value)),
            Detached::Node(node) => node.collect_post_order(&mut out),
        }
        out
    }
}

impl<V> PathNode<V> {
    pub(crate) fn new(path: FilePath) -> Self {
        Self {
            path,
            value: None,
            leaves: HashMap::new(),
            subtrees: HashMap::new(),
            count: 0,
        }
    }

    pub(crate) fn with_value(path: FilePath, value: V) -> Self {
        Self {
            value: Some(value),
            count: 1,
            ..Self::new(path)
        }
    }

    /// The path this node represents.
    pub fn path(&self) -> &FilePath {
        &self.path
    }

    /// The value stored exactly at this node's path.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Number of values in this node's subtree, its own value included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of direct children without descendants.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Direct children that root deeper subtrees.
    pub fn subtrees(&self) -> impl Iterator<Item = &PathNode<V>> {
        self.subtrees.values()
    }

    /// Every `(key, value)` pair in this subtree.
    pub fn pairs(&self) -> Pairs<'_, V> {
        Pairs::new(self)
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self)
    }

    /// Locate `key`, which must already be known to lie under this node's path.
    pub(crate) fn locate<C: PathComparer>(&self, key: &FilePath, c: &C) -> Option<Located<'_, V>> {
        let depth = key.len();
        let mut node = self;
        loop {
            let d = node.path.len();
            if d == depth {
                return Some(Located::Node(node));
            }
            let seg = c.segment_key(&key.segments()[d]);
            if d + 1 == depth {
                if let Some(leaf) = node.leaves.get(&*seg) {
                    return Some(Located::Leaf(leaf));
                }
            }
            node = node.subtrees.get(&*seg)?;
        }
    }

    pub(crate) fn find<C: PathComparer>(&self, key: &FilePath, c: &C) -> Option<&V> {
        match self.locate(key, c)? {
            Located::Leaf(leaf) => Some(&leaf.value),
            Located::Node(node) => node.value.as_ref(),
        }
    }

    pub(crate) fn find_mut<C: PathComparer>(&mut self, key: &FilePath, c: &C) -> Option<&mut V> {
        let depth = key.len();
        let mut node = self;
        loop {
            let d = node.path.len();
            if d == depth {
                return node.value.as_mut();
            }
            let seg = c.segment_key(&key.segments()[d]);
            if d + 1 == depth && node.leaves.contains_key(&*seg) {
                return node.leaves.get_mut(&*seg).map(|leaf| &mut leaf.value);
            }
            node = node.subtrees.get_mut(&*seg)?;
        }
    }

    /// Insert `value` at `key`, promoting a leaf to a subtree when `key` lies
    /// beneath it.
    pub(crate) fn insert_entry<C: PathComparer>(
        &mut self,
        key: FilePath,
        value: V,
        c: &C,
    ) -> Result<(), StoreError> {
        let d = self.path.len();
        if key.len() == d {
            if self.value.is_some() {
                return Err(StoreError::KeyAlreadyExists(key));
            }
            trace!(path = %key, "insert at node");
            self.value = Some(value);
            self.count += 1;
            return Ok(());
        }

        let seg = c.segment_key(&key.segments()[d]).into_owned();
        if key.len() == d + 1 {
            if self.leaves.contains_key(&seg) {
                return Err(StoreError::KeyAlreadyExists(key));
            }
            if let Some(subtree) = self.subtrees.get_mut(&seg) {
                subtree.insert_entry(key, value, c)?;
            } else {
                trace!(path = %key, "insert leaf");
                self.leaves.insert(seg, Leaf { path: key, value });
            }
            self.count += 1;
            return Ok(());
        }

        if let Some(subtree) = self.subtrees.get_mut(&seg) {
            subtree.insert_entry(key, value, c)?;
        } else {
            let mut subtree = match self.leaves.remove(&seg) {
                Some(leaf) => {
                    debug!(path = %leaf.path, "promoting leaf to subtree");
                    PathNode::with_value(leaf.path, leaf.value)
                }
                None => match key.prefix(d + 1) {
                    Some(child_path) => PathNode::new(child_path),
                    None => {
                        return Err(StoreError::InternalInconsistency(format!(
                            "no child prefix for {} at depth {}",
                            key,
                            d + 1
                        )))
                    }
                },
            };
            subtree.insert_entry(key, value, c)?;
            self.subtrees.insert(seg, subtree);
        }
        self.count += 1;
        Ok(())
    }

    /// Remove `key`. When `key` names a subtree, the whole subtree is cleared
    /// and every entry in it is reported to `observer`. Returns the number of
    /// entries removed.
    pub(crate) fn remove_entry<C, O>(&mut self, key: &FilePath, c: &C, observer: &mut O) -> usize
    where
        C: PathComparer,
        O: ChangeObserver<V> + ?Sized,
    {
        let d = self.path.len();
        if key.len() == d {
            return self.drain_into(observer);
        }
        let seg = c.segment_key(&key.segments()[d]).into_owned();
        if key.len() == d + 1 && self.leaves.remove(&seg).is_some() {
            trace!(path = %key, "removed leaf");
            self.count -= 1;
            return 1;
        }
        let removed = match self.subtrees.get_mut(&seg) {
            Some(subtree) => subtree.remove_entry(key, c, observer),
            None => return 0,
        };
        self.count -= removed;
        self.tidy_child(&seg);
        removed
    }

    /// Remove every entry in this subtree, reporting each one to `observer`
    /// before it is dropped. Returns the number of entries removed.
    pub(crate) fn drain_into<O>(&mut self, observer: &mut O) -> usize
    where
        O: ChangeObserver<V> + ?Sized,
    {
        let removed = self.count;
        if let Some(value) = self.value.take() {
            observer.entry_removed(&self.path, &value);
        }
        for (_, leaf) in self.leaves.drain() {
            observer.entry_removed(&leaf.path, &leaf.value);
        }
        for (_, mut subtree) in self.subtrees.drain() {
            subtree.drain_into(&mut *observer);
        }
        self.count = 0;
        removed
    }

    /// Take the entry or subtree at `key` out of this node.
    pub(crate) fn detach<C: PathComparer>(&mut self, key: &FilePath, c: &C) -> Option<Detached<V>> {
        let d = self.path.len();
        if key.len() <= d {
            return None;
        }
        let seg = c.segment_key(&key.segments()[d]).into_owned();
        if key.len() == d + 1 {
            if let Some(leaf) = self.leaves.remove(&seg) {
                self.count -= 1;
                return Some(Detached::Leaf(leaf));
            }
            let subtree = self.subtrees.remove(&seg)?;
            self.count -= subtree.count;
            return Some(Detached::Node(subtree));
        }
        let detached = self.subtrees.get_mut(&seg)?.detach(key, c)?;
        self.count -= detached.len();
        self.tidy_child(&seg);
        Some(detached)
    }

    /// Move the entry or subtree at `old` to `new` within the subtree rooted at
    /// their overlap path, which is `overlap_len` segments deep. Each moved
    /// entry is reported to `observer` once it sits at its new key.
    ///
    /// Callers have already checked that no destination key is occupied.
    pub(crate) fn relocate<C, O>(
        &mut self,
        old: &FilePath,
        new: &FilePath,
        overlap_len: usize,
        c: &C,
        observer: &mut O,
    ) -> Result<usize, StoreError>
    where
        C: PathComparer,
        O: ChangeObserver<V> + ?Sized,
    {
        let d = self.path.len();
        if d < overlap_len {
            let seg = c.segment_key(&old.segments()[d]).into_owned();
            let moved = match self.subtrees.get_mut(&seg) {
                Some(subtree) => subtree.relocate(old, new, overlap_len, c, observer)?,
                None => return Err(StoreError::KeyNotFound(old.clone())),
            };
            self.tidy_child(&seg);
            return Ok(moved);
        }

        let detached = self
            .detach(old, c)
            .ok_or_else(|| StoreError::KeyNotFound(old.clone()))?;
        if matches!(detached, Detached::Node(_)) {
            debug!(from = %old, to = %new, entries = detached.len(), "relocating subtree");
        }
        let entries = detached.into_entries();
        let moved = entries.len();
        for (old_path, value) in entries {
            let new_path = old_path.reparent(old.len(), new);
            self.insert_entry(new_path.clone(), value, c)?;
            let value = self.find(&new_path, c).ok_or_else(|| {
                StoreError::InternalInconsistency(format!("relocated entry {} vanished", new_path))
            })?;
            trace!(from = %old_path, to = %new_path, "relocated entry");
            observer.entry_relocated(&old_path, &new_path, value);
        }
        Ok(moved)
    }

    /// Prune an emptied child subtree, or demote a child subtree that holds
    /// only its own value back to a leaf.
    fn tidy_child(&mut self, seg: &str) {
        let Some(subtree) = self.subtrees.get(seg) else {
            return;
        };
        if subtree.count == 0 {
            debug!(path = %subtree.path, "pruning empty subtree");
            self.subtrees.remove(seg);
        } else if subtree.leaves.is_empty() && subtree.subtrees.is_empty() {
            if let Some(subtree) = self.subtrees.remove(seg) {
                if let Some(value) = subtree.value {
                    debug!(path = %subtree.path, "demoting subtree to leaf");
                    self.leaves.insert(
                        seg.to_string(),
                        Leaf {
                            path: subtree.path,
                            value,
                        },
                    );
                }
            }
        }
    }

    fn collect_post_order(self, out: &mut Vec<(FilePath, V)>) {
        for (_, leaf) in self.leaves {
            out.push((leaf.path, leaf.value));
        }
        for (_, subtree) in self.subtrees {
            subtree.collect_post_order(out);
        }
        if let Some(value) = self.value {
            out.push((self.path, value));
        }
    }

    /// Check every structural invariant below this node by full traversal.
    /// Returns the number of values found.
    pub(crate) fn verify<C: PathComparer>(&self, c: &C) -> Result<usize, StoreError> {
        let d = self.path.len();
        let mut found = usize::from(self.value.is_some());

        for (seg, leaf) in &self.leaves {
            self.check_child(seg, &leaf.path, c)?;
            if self.subtrees.contains_key(seg) {
                return Err(StoreError::InternalInconsistency(format!(
                    "{} is both a leaf and a subtree",
                    leaf.path
                )));
            }
            found += 1;
        }

        for (seg, subtree) in &self.subtrees {
            self.check_child(seg, &subtree.path, c)?;
            if subtree.count == 0 {
                return Err(StoreError::InternalInconsistency(format!(
                    "empty subtree left at {}",
                    subtree.path
                )));
            }
            if subtree.leaves.is_empty() && subtree.subtrees.is_empty() {
                return Err(StoreError::InternalInconsistency(format!(
                    "subtree {} has no descendants and should be a leaf",
                    subtree.path
                )));
            }
            found += subtree.verify(c)?;
        }

        if found != self.count {
            return Err(StoreError::InternalInconsistency(format!(
                "count at {} (depth {}) is {} but {} entries are stored",
                self.path, d, self.count, found
            )));
        }
        Ok(found)
    }

    fn check_child<C: PathComparer>(
        &self,
        seg: &str,
        child: &FilePath,
        c: &C,
    ) -> Result<(), StoreError> {
        let d = self.path.len();
        let attached = child.len() == d + 1
            && c.is_prefix(&self.path, child)
            && c.segment_key(child.name()) == seg;
        if attached {
            Ok(())
        } else {
            Err(StoreError::InternalInconsistency(format!(
                "{} is filed under {} as {:?}",
                child, self.path, seg
            )))
        }
    }
}
