//! Random operation sequences checked against a flat map model.

use proptest::prelude::*;
use std::collections::BTreeMap;
use syncpath::{FilePath, PathStore, StoreError};

#[derive(Debug, Clone)]
enum Op {
    Insert(Vec<String>, u32),
    Remove(Vec<String>),
    Rename(Vec<String>, Vec<String>),
    Clear,
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4)
        .prop_map(|segs| segs.into_iter().map(String::from).collect())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (segments(), any::<u32>()).prop_map(|(s, v)| Op::Insert(s, v)),
        2 => segments().prop_map(Op::Remove),
        3 => (segments(), segments()).prop_map(|(a, b)| Op::Rename(a, b)),
        1 => Just(Op::Clear),
    ]
}

fn key(segs: &[String]) -> FilePath {
    FilePath::root("r").join_segments(segs)
}

fn under(path: &FilePath, prefix: &FilePath) -> bool {
    path.starts_with(prefix)
}

/// Apply `op` to the model, mirroring the store's contract.
fn apply_model(model: &mut BTreeMap<FilePath, u32>, op: &Op) -> Result<(), ()> {
    match op {
        Op::Insert(s, v) => {
            let k = key(s);
            if model.contains_key(&k) {
                return Err(());
            }
            model.insert(k, *v);
        }
        Op::Remove(s) => {
            let k = key(s);
            model.retain(|path, _| !under(path, &k));
        }
        Op::Rename(a, b) => {
            let (from, to) = (key(a), key(b));
            if from == to || under(&to, &from) || model.contains_key(&to) {
                return Err(());
            }
            let moving: Vec<FilePath> = model
                .keys()
                .filter(|path| under(path, &from))
                .cloned()
                .collect();
            if moving.is_empty() {
                return Err(());
            }
            let rebased: Vec<FilePath> = moving
                .iter()
                .map(|path| path.rebase(&from, &to).unwrap())
                .collect();
            if rebased
                .iter()
                .any(|path| model.contains_key(path) && !under(path, &from))
            {
                return Err(());
            }
            let values: Vec<u32> = moving.iter().map(|path| model.remove(path).unwrap()).collect();
            for (path, value) in rebased.into_iter().zip(values) {
                model.insert(path, value);
            }
        }
        Op::Clear => model.clear(),
    }
    Ok(())
}

fn apply_store(store: &mut PathStore<u32>, op: &Op) -> Result<(), StoreError> {
    match op {
        Op::Insert(s, v) => store.insert(key(s), *v),
        Op::Remove(s) => store.remove(&key(s)).map(|_| ()),
        Op::Rename(a, b) => store.rename(&key(a), &key(b)),
        Op::Clear => {
            store.clear();
            Ok(())
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn store_matches_model(ops in prop::collection::vec(op(), 1..40)) {
        let mut store = PathStore::create(FilePath::root("r"), None);
        let mut model = BTreeMap::new();

        for op in &ops {
            let expected = apply_model(&mut model, op);
            let actual = apply_store(&mut store, op);
            prop_assert_eq!(expected.is_ok(), actual.is_ok(), "{:?} -> {:?}", op, actual);
            prop_assert!(store.verify().is_ok(), "verify failed after {:?}", op);
            prop_assert_eq!(store.count(), model.len());
        }

        for (path, value) in &model {
            prop_assert_eq!(store.get(path), Some(value));
        }
        let mut pairs: Vec<(FilePath, u32)> = store
            .pairs()
            .iter()
            .map(|(path, value)| (path.clone(), *value))
            .collect();
        pairs.sort();
        let expected: Vec<(FilePath, u32)> = model.into_iter().collect();
        prop_assert_eq!(pairs, expected);
    }

    #[test]
    fn enumeration_sizes_agree(inserts in prop::collection::vec((segments(), any::<u32>()), 0..30)) {
        let mut store = PathStore::create(FilePath::root("r"), None);
        for (s, v) in &inserts {
            let _ = store.insert(key(s), *v);
        }
        let count = store.count();
        prop_assert_eq!(store.keys().iter().count(), count);
        prop_assert_eq!(store.values().iter().count(), count);
        prop_assert_eq!(store.pairs().iter().count(), count);
        prop_assert_eq!(store.keys().iter().len(), count);
    }

    #[test]
    fn subtree_rename_fires_one_notification_per_entry(
        inside in prop::collection::btree_set(segments(), 1..10),
    ) {
        let relocated = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&relocated);
        let callbacks = syncpath::ChangeCallbacks::new()
            .on_relocated(move |old: &FilePath, new: &FilePath, _: &u32| {
                sink.lock().push((old.clone(), new.clone()));
            });
        let mut store = PathStore::builder(FilePath::root("r"))
            .observer(callbacks)
            .build();

        let from = FilePath::parse("r/src").unwrap();
        let to = FilePath::parse("r/dst/x").unwrap();
        for (i, s) in inside.iter().enumerate() {
            store.insert(from.join_segments(s), i as u32).unwrap();
        }
        store.rename(&from, &to).unwrap();

        let relocated = relocated.lock();
        prop_assert_eq!(relocated.len(), inside.len());
        for (old, new) in relocated.iter() {
            let rebased = old.rebase(&from, &to);
            prop_assert_eq!(rebased.as_ref(), Some(new));
            prop_assert!(store.contains(new));
        }
        prop_assert_eq!(store.subtree_count(&to), inside.len());
        prop_assert!(store.verify().is_ok());
    }
}
