//! Path-indexed store
//!
//! `PathStore` maps every path under a declared root to a value and keeps
//! that mapping correct across inserts, removals and renames of single
//! entries or whole subtrees. It is not internally synchronized: callers that
//! share a store across threads wrap it in their own lock and hold it across
//! each operation, `rename` included.

pub(crate) mod node;

pub use node::PathNode;

use crate::comparer::{ExactComparer, PathComparer};
use crate::error::{InvalidKeyReason, StoreError};
use crate::observer::{ChangeObserver, NoopObserver};
use crate::path::FilePath;
use crate::views::{Keys, Pairs, Values};
use node::Located;
use tracing::{debug, instrument, warn};

/// Hierarchical path-to-value store.
#[derive(Debug, Clone)]
pub struct PathStore<V, C = ExactComparer, O = NoopObserver> {
    root: PathNode<V>,
    comparer: C,
    observer: O,
}

/// Builder for a [`PathStore`] with a non-default comparer or observer.
#[derive(Debug)]
pub struct PathStoreBuilder<V, C = ExactComparer, O = NoopObserver> {
    root_path: FilePath,
    root_value: Option<V>,
    comparer: C,
    observer: O,
}

impl<V> PathStore<V> {
    /// Create a store rooted at `root_path` with exact path comparison and no
    /// observer.
    pub fn create(root_path: FilePath, root_value: Option<V>) -> Self {
        Self::builder(root_path).root_value(root_value).build()
    }

    pub fn builder(root_path: FilePath) -> PathStoreBuilder<V> {
        PathStoreBuilder {
            root_path,
            root_value: None,
            comparer: ExactComparer,
            observer: NoopObserver,
        }
    }
}

impl<V, C, O> PathStoreBuilder<V, C, O> {
    pub fn root_value(mut self, value: Option<V>) -> Self {
        self.root_value = value;
        self
    }

    pub fn comparer<C2: PathComparer>(self, comparer: C2) -> PathStoreBuilder<V, C2, O> {
        PathStoreBuilder {
            root_path: self.root_path,
            root_value: self.root_value,
            comparer,
            observer: self.observer,
        }
    }

    pub fn observer<O2: ChangeObserver<V>>(self, observer: O2) -> PathStoreBuilder<V, C, O2> {
        PathStoreBuilder {
            root_path: self.root_path,
            root_value: self.root_value,
            comparer: self.comparer,
            observer,
        }
    }

    pub fn build(self) -> PathStore<V, C, O> {
        let root = match self.root_value {
            Some(value) => PathNode::with_value(self.root_path, value),
            None => PathNode::new(self.root_path),
        };
        PathStore {
            root,
            comparer: self.comparer,
            observer: self.observer,
        }
    }
}

impl<V, C: PathComparer, O: ChangeObserver<V>> PathStore<V, C, O> {
    /// The path every key must live under.
    pub fn root_path(&self) -> &FilePath {
        &self.root.path
    }

    /// The root node, for read-only structural inspection.
    pub fn root(&self) -> &PathNode<V> {
        &self.root
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Number of stored entries, the root value included.
    pub fn count(&self) -> usize {
        self.root.count
    }

    pub fn len(&self) -> usize {
        self.root.count
    }

    pub fn is_empty(&self) -> bool {
        self.root.count == 0
    }

    fn within_root(&self, key: &FilePath) -> bool {
        self.comparer.is_prefix(&self.root.path, key)
    }

    fn check_within_root(&self, key: &FilePath) -> Result<(), StoreError> {
        if self.within_root(key) {
            Ok(())
        } else {
            Err(StoreError::invalid(key, InvalidKeyReason::OutsideRoot))
        }
    }

    /// Value stored exactly at `key`.
    pub fn get(&self, key: &FilePath) -> Option<&V> {
        if !self.within_root(key) {
            return None;
        }
        self.root.find(key, &self.comparer)
    }

    pub fn get_mut(&mut self, key: &FilePath) -> Option<&mut V> {
        if !self.within_root(key) {
            return None;
        }
        self.root.find_mut(key, &self.comparer)
    }

    /// Like [`get`](Self::get), reporting a missing key as `KeyNotFound`.
    pub fn try_get(&self, key: &FilePath) -> Result<&V, StoreError> {
        self.get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }

    pub fn contains(&self, key: &FilePath) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries at or below `key`.
    pub fn subtree_count(&self, key: &FilePath) -> usize {
        if !self.within_root(key) {
            return 0;
        }
        match self.root.locate(key, &self.comparer) {
            Some(Located::Leaf(_)) => 1,
            Some(Located::Node(node)) => node.count,
            None => 0,
        }
    }

    /// Store `value` at `key`.
    ///
    /// Fails with `InvalidKey` when `key` is outside the root and with
    /// `KeyAlreadyExists` when `key` already holds a value.
    pub fn insert(&mut self, key: FilePath, value: V) -> Result<(), StoreError> {
        self.check_within_root(&key)?;
        self.root.insert_entry(key, value, &self.comparer)
    }

    /// Store `value` at `key`, replacing and returning any previous value.
    pub fn upsert(&mut self, key: FilePath, value: V) -> Result<Option<V>, StoreError> {
        self.check_within_root(&key)?;
        if let Some(slot) = self.root.find_mut(&key, &self.comparer) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        self.root.insert_entry(key, value, &self.comparer)?;
        Ok(None)
    }

    /// Remove `key`. When `key` roots a subtree (the store root included) the
    /// whole subtree goes, and the observer hears about every entry in it.
    ///
    /// Returns `Ok(false)` when nothing is stored at or below `key`.
    pub fn remove(&mut self, key: &FilePath) -> Result<bool, StoreError> {
        self.check_within_root(key)?;
        let removed = self
            .root
            .remove_entry(key, &self.comparer, &mut self.observer);
        if removed > 1 {
            debug!(path = %key, removed, "removed subtree");
        }
        Ok(removed > 0)
    }

    /// Remove every entry, notifying the observer of each one.
    #[instrument(skip_all, fields(root = %self.root.path))]
    pub fn clear(&mut self) {
        if self.root.count == 0 {
            return;
        }
        let removed = self.root.drain_into(&mut self.observer);
        debug!(removed, "cleared store");
    }

    /// Move the entry or subtree at `old_key` to `new_key`.
    ///
    /// Every moved entry is reported to the observer individually. The
    /// destination is checked in full before anything moves, so a failed
    /// rename leaves the store unchanged.
    ///
    /// Keys that compare equal under the comparer but are spelled differently
    /// (`sync/docs` to `sync/Docs` under [`CaseInsensitiveComparer`]) respell
    /// the stored keys in place. Only an exactly identical key is `SameKey`.
    ///
    /// [`CaseInsensitiveComparer`]: crate::comparer::CaseInsensitiveComparer
    #[instrument(skip_all, fields(from = %old_key, to = %new_key))]
    pub fn rename(&mut self, old_key: &FilePath, new_key: &FilePath) -> Result<(), StoreError> {
        let c = &self.comparer;
        self.check_within_root(old_key)?;
        self.check_within_root(new_key)?;
        if old_key == new_key {
            return Err(StoreError::invalid(old_key, InvalidKeyReason::SameKey));
        }
        let respelling = c.paths_eq(old_key, new_key);
        if c.paths_eq(old_key, &self.root.path) {
            return Err(StoreError::invalid(old_key, InvalidKeyReason::RootRename));
        }
        if !respelling && c.is_prefix(old_key, new_key) {
            return Err(StoreError::invalid(
                new_key,
                InvalidKeyReason::DestinationInsideSource,
            ));
        }

        match self.root.locate(old_key, c) {
            None => return Err(StoreError::KeyNotFound(old_key.clone())),
            Some(Located::Node(node)) if node.count == 0 => {
                return Err(StoreError::KeyNotFound(old_key.clone()))
            }
            _ if !respelling && self.contains(new_key) => {
                return Err(StoreError::KeyAlreadyExists(new_key.clone()))
            }
            Some(Located::Leaf(_)) => {}
            Some(Located::Node(node)) => {
                for path in node.keys() {
                    let target = path.reparent(old_key.len(), new_key);
                    // entries inside the source are gone by the time anything lands
                    if self.contains(&target) && !c.is_prefix(old_key, &target) {
                        return Err(StoreError::KeyAlreadyExists(target));
                    }
                }
            }
        }

        // a respelled key shares every segment, so move it from its parent
        let overlap_len = c.common_prefix_len(old_key, new_key).min(old_key.len() - 1);
        let before = self.root.count;
        let moved = self.root.relocate(
            old_key,
            new_key,
            overlap_len,
            &self.comparer,
            &mut self.observer,
        )?;
        debug!(moved, "rename complete");

        if self.root.count != before {
            warn!(before, after = self.root.count, "entry count changed across rename");
            return Err(StoreError::InternalInconsistency(format!(
                "rename {} -> {} changed the entry count from {} to {}",
                old_key, new_key, before, self.root.count
            )));
        }
        Ok(())
    }

    /// Check every structural and count invariant by full traversal.
    pub fn verify(&self) -> Result<(), StoreError> {
        match self.root.verify(&self.comparer) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "store failed verification");
                Err(e)
            }
        }
    }

    /// All stored keys.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(&self.root)
    }

    /// All stored values.
    pub fn values(&self) -> Values<'_, V> {
        Values::new(&self.root)
    }

    /// All stored `(key, value)` pairs.
    pub fn pairs(&self) -> Pairs<'_, V> {
        Pairs::new(&self.root)
    }

    /// Pairs stored at or below `key`. Empty when nothing is stored there.
    pub fn entries_under(&self, key: &FilePath) -> Pairs<'_, V> {
        if !self.within_root(key) {
            return Pairs::empty();
        }
        match self.root.locate(key, &self.comparer) {
            Some(Located::Node(node)) => Pairs::new(node),
            Some(Located::Leaf(leaf)) => Pairs::single(&leaf.path, &leaf.value),
            None => Pairs::empty(),
        }
    }
}

impl<'a, V, C: PathComparer, O: ChangeObserver<V>> IntoIterator for &'a PathStore<V, C, O> {
    type Item = (&'a FilePath, &'a V);
    type IntoIter = crate::views::PairsIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs().iter()
    }
}
