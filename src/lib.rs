//! syncpath: path-indexed sync state
//!
//! A hierarchical store that maps file paths under a declared root to
//! per-file sync state. Entries live as cheap leaves until they gain
//! descendants, at which point they are promoted to subtree nodes; emptied
//! subtrees are pruned and demoted again. Whole subtrees can be removed or
//! renamed in one operation, with every affected entry reported to an
//! observer.
//!
//! ```
//! use syncpath::{FilePath, PathStore};
//!
//! let p = |s: &str| FilePath::parse(s).unwrap();
//! let mut store = PathStore::create(p("sync"), None);
//! store.insert(p("sync/docs/a.txt"), 1).unwrap();
//! store.insert(p("sync/docs/b.txt"), 2).unwrap();
//! store.rename(&p("sync/docs"), &p("sync/archive")).unwrap();
//!
//! assert_eq!(store.get(&p("sync/archive/b.txt")), Some(&2));
//! assert!(!store.contains(&p("sync/docs/a.txt")));
//! assert_eq!(store.len(), 2);
//! ```

pub mod cli;
pub mod comparer;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod observer;
pub mod path;
pub mod replay;
pub mod store;
pub mod views;

pub use comparer::{
    CaseInsensitiveComparer, Comparison, ConfiguredComparer, ExactComparer, NfcComparer,
    PathComparer,
};
pub use error::{ApiError, InvalidKeyReason, PathError, StoreError};
pub use notifier::{ChangeNotifier, EntryDeleted, EntryRelocated, SubscriptionId};
pub use observer::{ChangeCallbacks, ChangeObserver, NoopObserver};
pub use path::FilePath;
pub use store::{PathNode, PathStore, PathStoreBuilder};
pub use views::{Keys, Pairs, Values};
