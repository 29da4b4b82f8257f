//! Store behavior: round trips, promotion, clear, error cases and
//! enumeration completeness.

use super::test_utils::{p, recording_callbacks};
use syncpath::{InvalidKeyReason, PathStore, StoreError};

/// insert then get returns the value; remove then get is absent
#[test]
fn test_insert_get_remove_round_trip() {
    let mut store = PathStore::create(p("drive"), None);
    store.insert(p("drive/docs/report.txt"), "synced").unwrap();

    assert_eq!(store.get(&p("drive/docs/report.txt")), Some(&"synced"));
    assert!(store.contains(&p("drive/docs/report.txt")));
    assert!(!store.contains(&p("drive/docs")), "prefixes do not match");

    assert!(store.remove(&p("drive/docs/report.txt")).unwrap());
    assert_eq!(store.get(&p("drive/docs/report.txt")), None);
    assert_eq!(store.count(), 0);
    store.verify().unwrap();
}

#[test]
fn test_rename_preserves_value() {
    let mut store = PathStore::create(p("drive"), None);
    store.insert(p("drive/a.txt"), 7).unwrap();
    store.rename(&p("drive/a.txt"), &p("drive/b/c.txt")).unwrap();

    assert_eq!(store.get(&p("drive/a.txt")), None);
    assert_eq!(store.get(&p("drive/b/c.txt")), Some(&7));
    assert_eq!(store.count(), 1);
    store.verify().unwrap();
}

/// Promotion from leaf to subtree keeps the leaf's value
#[test]
fn test_promotion_keeps_parent_value() {
    let mut store = PathStore::create(p("drive"), None);
    store.insert(p("drive/a"), 1).unwrap();
    store.insert(p("drive/a/b"), 2).unwrap();

    assert_eq!(store.get(&p("drive/a")), Some(&1));
    assert_eq!(store.get(&p("drive/a/b")), Some(&2));
    assert_eq!(store.count(), 2);
    assert_eq!(store.subtree_count(&p("drive/a")), 2);
    store.verify().unwrap();
}

#[test]
fn test_clear_is_idempotent() {
    let (callbacks, recorded) = recording_callbacks::<u32>();
    let mut store = PathStore::builder(p("drive"))
        .observer(callbacks)
        .build();

    store.clear();
    assert!(recorded.removed().is_empty());

    store.insert(p("drive/a"), 1).unwrap();
    store.insert(p("drive/a/b"), 2).unwrap();
    store.insert(p("drive/c/d/e"), 3).unwrap();
    store.clear();

    let mut removed = recorded.removed();
    removed.sort();
    assert_eq!(removed, vec!["drive/a/b=2", "drive/a=1", "drive/c/d/e=3"]);
    assert_eq!(store.count(), 0);
    store.verify().unwrap();

    store.clear();
    assert_eq!(recorded.removed().len(), 3, "second clear fires nothing");
}

#[test]
fn test_clear_reports_root_value() {
    let (callbacks, recorded) = recording_callbacks::<u32>();
    let mut store = PathStore::builder(p("drive"))
        .root_value(Some(0))
        .observer(callbacks)
        .build();
    store.insert(p("drive/a"), 1).unwrap();
    store.clear();

    let mut removed = recorded.removed();
    removed.sort();
    assert_eq!(removed, vec!["drive/a=1", "drive=0"]);
    assert!(store.is_empty());
}

#[test]
fn test_error_cases() {
    let mut store = PathStore::create(p("drive"), None);
    store.insert(p("drive/a"), 1).unwrap();

    assert_eq!(
        store.insert(p("drive/a"), 2),
        Err(StoreError::KeyAlreadyExists(p("drive/a")))
    );
    assert_eq!(store.get(&p("drive/a")), Some(&1), "failed insert changes nothing");

    assert!(matches!(
        store.rename(&p("drive"), &p("drive/z")),
        Err(StoreError::InvalidKey {
            reason: InvalidKeyReason::RootRename,
            ..
        })
    ));
    assert!(matches!(
        store.rename(&p("drive/a"), &p("drive/a")),
        Err(StoreError::InvalidKey {
            reason: InvalidKeyReason::SameKey,
            ..
        })
    ));
    assert_eq!(
        store.try_get(&p("drive/missing")),
        Err(StoreError::KeyNotFound(p("drive/missing")))
    );
    assert_eq!(store.remove(&p("drive/missing")), Ok(false));
    assert!(matches!(
        store.insert(p("other/a"), 3),
        Err(StoreError::InvalidKey {
            reason: InvalidKeyReason::OutsideRoot,
            ..
        })
    ));
}

#[test]
fn test_rename_missing_source_and_occupied_destination() {
    let mut store = PathStore::create(p("drive"), None);
    store.insert(p("drive/a"), 1).unwrap();
    store.insert(p("drive/b"), 2).unwrap();

    assert_eq!(
        store.rename(&p("drive/nope"), &p("drive/c")),
        Err(StoreError::KeyNotFound(p("drive/nope")))
    );
    assert_eq!(
        store.rename(&p("drive/a"), &p("drive/b")),
        Err(StoreError::KeyAlreadyExists(p("drive/b")))
    );
    assert_eq!(store.get(&p("drive/a")), Some(&1));
    assert_eq!(store.get(&p("drive/b")), Some(&2));
    store.verify().unwrap();
}

#[test]
fn test_enumeration_completeness() {
    let mut store = PathStore::create(p("drive"), Some(0));
    for (i, path) in [
        "drive/a",
        "drive/a/b",
        "drive/a/b/c",
        "drive/a/d",
        "drive/e",
        "drive/f/g/h",
    ]
    .iter()
    .enumerate()
    {
        store.insert(p(path), i + 1).unwrap();
    }

    let count = store.count();
    assert_eq!(count, 7);
    assert_eq!(store.keys().iter().count(), count);
    assert_eq!(store.values().iter().count(), count);
    assert_eq!(store.pairs().iter().count(), count);
    assert_eq!(store.keys().len(), count);
    assert_eq!((&store).into_iter().count(), count);
}

#[test]
fn test_removing_interior_path_removes_subtree() {
    let (callbacks, recorded) = recording_callbacks::<u32>();
    let mut store = PathStore::builder(p("drive"))
        .observer(callbacks)
        .build();
    store.insert(p("drive/a/b"), 1).unwrap();
    store.insert(p("drive/a/c/d"), 2).unwrap();
    store.insert(p("drive/e"), 3).unwrap();

    assert!(store.remove(&p("drive/a")).unwrap());
    assert_eq!(store.count(), 1);
    assert_eq!(recorded.removed().len(), 2);
    assert_eq!(store.get(&p("drive/e")), Some(&3));
    assert_eq!(store.root().subtrees().count(), 0, "emptied subtree is pruned");
    store.verify().unwrap();
}

#[test]
fn test_single_leaf_removal_is_silent() {
    let (callbacks, recorded) = recording_callbacks::<u32>();
    let mut store = PathStore::builder(p("drive"))
        .observer(callbacks)
        .build();
    store.insert(p("drive/a"), 1).unwrap();
    assert!(store.remove(&p("drive/a")).unwrap());
    assert!(recorded.removed().is_empty());
}
