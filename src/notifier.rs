//! Recursive-change notifier
//!
//! `ChangeNotifier` turns the store's two structural callbacks into events
//! with any number of subscribers. Each event carries the state value the
//! notifier was built with, so subscribers can tell which index the change
//! belongs to.
//!
//! The subscriber lists sit behind a lock; delivery takes a snapshot of the
//! list and runs every handler outside the lock, synchronously, on the thread
//! that is mutating the store. Handlers may therefore subscribe or unsubscribe
//! (themselves included) while an event is being delivered; such changes take
//! effect from the next event.

use crate::observer::ChangeObserver;
use crate::path::FilePath;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An entry was removed during a subtree removal or `clear`.
#[derive(Debug)]
pub struct EntryDeleted<'a, S, V> {
    pub state: &'a S,
    pub path: &'a FilePath,
    pub value: &'a V,
}

/// An entry was moved during a `rename`.
#[derive(Debug)]
pub struct EntryRelocated<'a, S, V> {
    pub state: &'a S,
    pub old_path: &'a FilePath,
    pub new_path: &'a FilePath,
    pub value: &'a V,
}

type DeletedHandler<S, V> = Arc<dyn Fn(&EntryDeleted<'_, S, V>) + Send + Sync>;
type RelocatedHandler<S, V> = Arc<dyn Fn(&EntryRelocated<'_, S, V>) + Send + Sync>;

struct Subscribers<H> {
    handlers: Mutex<Vec<(SubscriptionId, H)>>,
}

impl<H: Clone> Subscribers<H> {
    fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, id: SubscriptionId, handler: H) {
        self.handlers.lock().push((id, handler));
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    fn snapshot(&self) -> Vec<H> {
        self.handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.handlers.lock().len()
    }
}

struct Inner<S, V> {
    state: S,
    next_id: AtomicU64,
    deleted: Subscribers<DeletedHandler<S, V>>,
    relocated: Subscribers<RelocatedHandler<S, V>>,
}

/// Multi-subscriber change events for a store.
///
/// Clones share subscribers and state: install one clone as the store's
/// observer and keep another to manage subscriptions.
pub struct ChangeNotifier<S, V> {
    inner: Arc<Inner<S, V>>,
}

impl<S, V> Clone for ChangeNotifier<S, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug, V> fmt::Debug for ChangeNotifier<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("state", &self.inner.state)
            .field("deleted_subscribers", &self.inner.deleted.len())
            .field("relocated_subscribers", &self.inner.relocated.len())
            .finish()
    }
}

impl<S, V> ChangeNotifier<S, V> {
    /// Create a notifier whose events all carry `state`.
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                state,
                next_id: AtomicU64::new(1),
                deleted: Subscribers::new(),
                relocated: Subscribers::new(),
            }),
        }
    }

    pub fn state(&self) -> &S {
        &self.inner.state
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe to entry deletions.
    pub fn on_entry_deleted<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&EntryDeleted<'_, S, V>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner.deleted.add(id, Arc::new(handler));
        id
    }

    /// Subscribe to entry relocations.
    pub fn on_entry_relocated<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&EntryRelocated<'_, S, V>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner.relocated.add(id, Arc::new(handler));
        id
    }

    /// Drop a subscription. Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.deleted.remove(id) || self.inner.relocated.remove(id)
    }

    /// Total number of live subscriptions across both events.
    pub fn subscriber_count(&self) -> usize {
        self.inner.deleted.len() + self.inner.relocated.len()
    }
}

impl<S, V> ChangeObserver<V> for ChangeNotifier<S, V> {
    fn entry_removed(&mut self, path: &FilePath, value: &V) {
        let handlers = self.inner.deleted.snapshot();
        trace!(path = %path, subscribers = handlers.len(), "delivering entry deleted");
        let event = EntryDeleted {
            state: &self.inner.state,
            path,
            value,
        };
        for handler in handlers {
            handler(&event);
        }
    }

    fn entry_relocated(&mut self, old_path: &FilePath, new_path: &FilePath, value: &V) {
        let handlers = self.inner.relocated.snapshot();
        trace!(from = %old_path, to = %new_path, subscribers = handlers.len(), "delivering entry relocated");
        let event = EntryRelocated {
            state: &self.inner.state,
            old_path,
            new_path,
            value,
        };
        for handler in handlers {
            handler(&event);
        }
    }
}
