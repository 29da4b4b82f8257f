//! ChangeNotifier installed as a store observer.

use super::test_utils::p;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use syncpath::{ChangeNotifier, FilePath, PathStore};

type Log = Arc<Mutex<Vec<String>>>;

fn store_with_notifier(
    state: &'static str,
) -> (
    PathStore<u32, syncpath::ExactComparer, ChangeNotifier<&'static str, u32>>,
    ChangeNotifier<&'static str, u32>,
) {
    let notifier = ChangeNotifier::new(state);
    let store = PathStore::builder(p("drive"))
        .observer(notifier.clone())
        .build();
    (store, notifier)
}

#[test]
fn test_rename_reaches_every_subscriber_with_state() {
    let (mut store, notifier) = store_with_notifier("account-1");
    let log: Log = Arc::default();
    for name in ["index", "ui"] {
        let log = Arc::clone(&log);
        notifier.on_entry_relocated(move |event| {
            log.lock().push(format!(
                "{}:{}:{}->{}",
                name, event.state, event.old_path, event.new_path
            ));
        });
    }

    store.insert(p("drive/a/b"), 1).unwrap();
    store.rename(&p("drive/a"), &p("drive/z")).unwrap();

    let mut log = log.lock().clone();
    log.sort();
    assert_eq!(
        log,
        vec![
            "index:account-1:drive/a/b->drive/z/b",
            "ui:account-1:drive/a/b->drive/z/b"
        ]
    );
}

#[test]
fn test_reverse_index_stays_consistent() {
    // An external path -> id map kept in step through notifications.
    let (mut store, notifier) = store_with_notifier("drive");
    let reverse: Arc<Mutex<std::collections::HashMap<FilePath, u32>>> = Arc::default();

    let index = Arc::clone(&reverse);
    notifier.on_entry_relocated(move |event| {
        let mut index = index.lock();
        index.remove(event.old_path);
        index.insert(event.new_path.clone(), *event.value);
    });
    let index = Arc::clone(&reverse);
    notifier.on_entry_deleted(move |event| {
        index.lock().remove(event.path);
    });

    for (id, path) in ["drive/a/x", "drive/a/y", "drive/a/y/z", "drive/b"]
        .iter()
        .enumerate()
    {
        store.insert(p(path), id as u32).unwrap();
        reverse.lock().insert(p(path), id as u32);
    }

    store.rename(&p("drive/a"), &p("drive/c/d")).unwrap();
    store.remove(&p("drive/c")).unwrap();

    let index = reverse.lock();
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(&p("drive/b")), Some(&3));
    assert_eq!(store.count(), 1);
}

#[test]
fn test_unsubscribe_during_subtree_removal() {
    let (mut store, notifier) = store_with_notifier("drive");
    let hits = Arc::new(AtomicUsize::new(0));
    let own_id = Arc::new(Mutex::new(None));

    let handle = notifier.clone();
    let counter = Arc::clone(&hits);
    let slot = Arc::clone(&own_id);
    let id = notifier.on_entry_deleted(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = slot.lock().take() {
            handle.unsubscribe(id);
        }
    });
    *own_id.lock() = Some(id);

    store.insert(p("drive/a/1"), 1).unwrap();
    store.insert(p("drive/a/2"), 2).unwrap();
    store.insert(p("drive/a/3"), 3).unwrap();
    store.remove(&p("drive/a")).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1, "only the first deletion is delivered");
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn test_subscribe_concurrently_with_delivery() {
    let (store, notifier) = store_with_notifier("drive");
    let store = Arc::new(Mutex::new(store));
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);
    notifier.on_entry_deleted(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let writer = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            for i in 0..50u32 {
                let mut store = store.lock();
                store.insert(p(&format!("drive/batch/{}", i)), i).unwrap();
                if i % 10 == 9 {
                    store.remove(&p("drive/batch")).unwrap();
                }
            }
        })
    };
    let subscriber = {
        let notifier = notifier.clone();
        std::thread::spawn(move || {
            let ids: Vec<_> = (0..20).map(|_| notifier.on_entry_deleted(|_| {})).collect();
            for id in ids {
                assert!(notifier.unsubscribe(id));
            }
        })
    };
    writer.join().unwrap();
    subscriber.join().unwrap();

    assert_eq!(delivered.load(Ordering::SeqCst), 50);
    assert_eq!(notifier.subscriber_count(), 1);
    assert!(store.lock().is_empty());
}
