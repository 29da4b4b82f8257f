//! Journal replay
//!
//! A journal is a JSON-lines file of store operations, one per line, e.g.
//!
//! ```text
//! {"op":"insert","path":"sync/docs/a.txt","value":{"size":12}}
//! {"op":"rename","from":"sync/docs","to":"sync/archive"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. [`Replayer`] applies
//! the operations to a `serde_json::Value` store and records every change
//! notification the store emits along the way.

use crate::comparer::ConfiguredComparer;
use crate::config::IndexConfig;
use crate::error::{ApiError, StoreError};
use crate::notifier::ChangeNotifier;
use crate::path::FilePath;
use crate::store::PathStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One journaled store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalOp {
    Insert { path: FilePath, value: Value },
    Upsert { path: FilePath, value: Value },
    Remove { path: FilePath },
    Rename { from: FilePath, to: FilePath },
    Clear,
}

/// A parsed operation with its 1-based journal line.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub line: usize,
    pub op: JournalOp,
}

/// Parse a whole journal. Fails on the first malformed line.
pub fn parse_journal(text: &str) -> Result<Vec<JournalEntry>, ApiError> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let op = serde_json::from_str(trimmed).map_err(|e| ApiError::JournalError {
            line,
            message: e.to_string(),
        })?;
        entries.push(JournalEntry { line, op });
    }
    Ok(entries)
}

/// A change notification observed during replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Deleted {
        index: String,
        path: FilePath,
        value: Value,
    },
    Relocated {
        index: String,
        from: FilePath,
        to: FilePath,
        value: Value,
    },
}

/// An operation the store rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayFailure {
    pub line: usize,
    pub error: String,
}

/// Outcome of replaying a journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub root: FilePath,
    pub applied: usize,
    pub failures: Vec<ReplayFailure>,
    pub entries: Vec<(FilePath, Value)>,
    pub events: Vec<ReplayEvent>,
}

pub type ReplayStore = PathStore<Value, ConfiguredComparer, ChangeNotifier<String, Value>>;

/// Applies journal operations to a fresh store.
pub struct Replayer {
    store: ReplayStore,
    events: Arc<Mutex<Vec<ReplayEvent>>>,
    applied: usize,
    failures: Vec<ReplayFailure>,
}

impl Replayer {
    pub fn new(config: &IndexConfig) -> Result<Self, ApiError> {
        let root = config.root_path()?;
        let notifier: ChangeNotifier<String, Value> = ChangeNotifier::new(root.to_string());
        let events = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        notifier.on_entry_deleted(move |event| {
            sink.lock().push(ReplayEvent::Deleted {
                index: event.state.clone(),
                path: event.path.clone(),
                value: event.value.clone(),
            });
        });
        let sink = Arc::clone(&events);
        notifier.on_entry_relocated(move |event| {
            sink.lock().push(ReplayEvent::Relocated {
                index: event.state.clone(),
                from: event.old_path.clone(),
                to: event.new_path.clone(),
                value: event.value.clone(),
            });
        });

        let store = PathStore::builder(root)
            .comparer(config.comparer())
            .observer(notifier)
            .build();

        Ok(Self {
            store,
            events,
            applied: 0,
            failures: Vec::new(),
        })
    }

    pub fn store(&self) -> &ReplayStore {
        &self.store
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &JournalOp) -> Result<(), StoreError> {
        match op {
            JournalOp::Insert { path, value } => self.store.insert(path.clone(), value.clone()),
            JournalOp::Upsert { path, value } => self
                .store
                .upsert(path.clone(), value.clone())
                .map(|_| ()),
            JournalOp::Remove { path } => {
                if !self.store.remove(path)? {
                    return Err(StoreError::KeyNotFound(path.clone()));
                }
                Ok(())
            }
            JournalOp::Rename { from, to } => self.store.rename(from, to),
            JournalOp::Clear => {
                self.store.clear();
                Ok(())
            }
        }
    }

    /// Apply every entry, recording rejected operations and continuing.
    #[instrument(skip_all, fields(root = %self.store.root_path(), ops = entries.len()))]
    pub fn apply_all(&mut self, entries: &[JournalEntry]) {
        for entry in entries {
            match self.apply(&entry.op) {
                Ok(()) => {
                    self.applied += 1;
                    debug!(line = entry.line, "applied journal entry");
                }
                Err(err) => {
                    warn!(line = entry.line, error = %err, "journal entry rejected");
                    self.failures.push(ReplayFailure {
                        line: entry.line,
                        error: err.to_string(),
                    });
                }
            }
        }
        info!(
            applied = self.applied,
            failed = self.failures.len(),
            entries = self.store.len(),
            "journal replayed"
        );
    }

    /// Apply every entry, stopping at the first rejected one, then check the
    /// store's structure.
    pub fn apply_strict(&mut self, entries: &[JournalEntry]) -> Result<(), ApiError> {
        for entry in entries {
            self.apply(&entry.op)
                .map_err(|source| ApiError::ReplayFailed {
                    line: entry.line,
                    source,
                })?;
            self.applied += 1;
        }
        self.store.verify()?;
        Ok(())
    }

    /// Notifications seen so far.
    pub fn events(&self) -> Vec<ReplayEvent> {
        self.events.lock().clone()
    }

    /// Snapshot of the current state, entries sorted by path.
    pub fn report(&self) -> ReplayReport {
        let mut entries: Vec<(FilePath, Value)> = self
            .store
            .pairs()
            .iter()
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        ReplayReport {
            root: self.store.root_path().clone(),
            applied: self.applied,
            failures: self.failures.clone(),
            entries,
            events: self.events(),
        }
    }
}
