//! Structural change observation
//!
//! The store reports entries it removes in bulk (subtree removal, `clear`) and
//! entries it moves during `rename`. Calls happen synchronously, in the middle
//! of the operation, in the caller's context.

use crate::path::FilePath;

/// Receives per-entry notifications from a [`PathStore`](crate::store::PathStore).
pub trait ChangeObserver<V> {
    /// An entry was removed as part of a subtree removal or `clear`.
    fn entry_removed(&mut self, _path: &FilePath, _value: &V) {}

    /// An entry now lives at `new_path` instead of `old_path`.
    fn entry_relocated(&mut self, _old_path: &FilePath, _new_path: &FilePath, _value: &V) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<V> ChangeObserver<V> for NoopObserver {}

impl<V, T: ChangeObserver<V> + ?Sized> ChangeObserver<V> for &mut T {
    fn entry_removed(&mut self, path: &FilePath, value: &V) {
        (**self).entry_removed(path, value);
    }

    fn entry_relocated(&mut self, old_path: &FilePath, new_path: &FilePath, value: &V) {
        (**self).entry_relocated(old_path, new_path, value);
    }
}

impl<V, T: ChangeObserver<V> + ?Sized> ChangeObserver<V> for Box<T> {
    fn entry_removed(&mut self, path: &FilePath, value: &V) {
        (**self).entry_removed(path, value);
    }

    fn entry_relocated(&mut self, old_path: &FilePath, new_path: &FilePath, value: &V) {
        (**self).entry_relocated(old_path, new_path, value);
    }
}

type RemovedCallback<V> = Box<dyn FnMut(&FilePath, &V) + Send>;
type RelocatedCallback<V> = Box<dyn FnMut(&FilePath, &FilePath, &V) + Send>;

/// Observer built from up to two plain callbacks.
pub struct ChangeCallbacks<V> {
    removed: Option<RemovedCallback<V>>,
    relocated: Option<RelocatedCallback<V>>,
}

impl<V> Default for ChangeCallbacks<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChangeCallbacks<V> {
    /// No callbacks installed.
    pub fn new() -> Self {
        Self {
            removed: None,
            relocated: None,
        }
    }

    pub fn on_removed<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&FilePath, &V) + Send + 'static,
    {
        self.removed = Some(Box::new(callback));
        self
    }

    pub fn on_relocated<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&FilePath, &FilePath, &V) + Send + 'static,
    {
        self.relocated = Some(Box::new(callback));
        self
    }
}

impl<V> ChangeObserver<V> for ChangeCallbacks<V> {
    fn entry_removed(&mut self, path: &FilePath, value: &V) {
        if let Some(callback) = self.removed.as_mut() {
            callback(path, value);
        }
    }

    fn entry_relocated(&mut self, old_path: &FilePath, new_path: &FilePath, value: &V) {
        if let Some(callback) = self.relocated.as_mut() {
            callback(old_path, new_path, value);
        }
    }
}

impl<V> std::fmt::Debug for ChangeCallbacks<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCallbacks")
            .field("removed", &self.removed.is_some())
            .field("relocated", &self.relocated.is_some())
            .finish()
    }
}
