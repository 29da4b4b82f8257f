//! A store shared across threads behind an external lock.

use super::test_utils::p;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use syncpath::PathStore;

#[test]
fn test_batches_under_a_coarse_lock() {
    let store = Arc::new(RwLock::new(PathStore::create(p("drive"), None)));

    let writers: Vec<_> = (0..4u32)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25u32 {
                    let mut guard = store.write();
                    guard.insert(p(&format!("drive/w{}/f{}", w, i)), w * 100 + i).unwrap();
                }
                let mut guard = store.write();
                guard
                    .rename(&p(&format!("drive/w{}", w)), &p(&format!("drive/done/w{}", w)))
                    .unwrap();
            })
        })
        .collect();

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..50 {
                let guard = store.read();
                assert_eq!(guard.keys().iter().count(), guard.count());
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    let guard = store.read();
    assert_eq!(guard.count(), 100);
    assert_eq!(guard.subtree_count(&p("drive/done")), 100);
    assert_eq!(guard.get(&p("drive/done/w3/f24")), Some(&324));
    guard.verify().unwrap();
}
