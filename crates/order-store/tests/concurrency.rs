//! Concurrent append/read tests for the in-memory order store.
//!
//! One writer appends orders tagged with their expected position while many
//! readers take snapshots. Every snapshot must be a prefix of the final
//! sequence and no reader may ever see the store shrink.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use order_store::{InMemoryOrderStore, Order, OrderStore};

const APPENDS: u64 = 1_000;
const READERS: usize = 8;

fn order(seq: u64) -> Order {
    Order::try_from(serde_json::json!({
        "seq": seq,
        "item": "widget",
        "lines": [{"sku": format!("SKU-{seq}"), "qty": seq % 7}],
    }))
    .unwrap()
}

fn seq_of(order: &Order) -> u64 {
    order.get("seq").and_then(|v| v.as_u64()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_observe_prefix_consistent_snapshots() {
    let store = InMemoryOrderStore::new();
    let completed = Arc::new(AtomicUsize::new(0));

    let writer = {
        let store = store.clone();
        let completed = Arc::clone(&completed);
        tokio::spawn(async move {
            for seq in 0..APPENDS {
                store.append(order(seq)).await;
                completed.store(seq as usize + 1, Ordering::SeqCst);
                if seq % 64 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    let mut readers = Vec::with_capacity(READERS);
    for _ in 0..READERS {
        let store = store.clone();
        let completed = Arc::clone(&completed);
        readers.push(tokio::spawn(async move {
            let mut last_len = 0;
            loop {
                let done_before = completed.load(Ordering::SeqCst);
                let snapshot = store.list_all().await;

                assert!(snapshot.len() >= done_before);
                assert!(snapshot.len() >= last_len, "store shrank");
                for (index, entry) in snapshot.iter().enumerate() {
                    assert_eq!(seq_of(entry), index as u64);
                    assert_eq!(entry.as_map().len(), 3, "partially constructed order");
                }

                if let Some(latest) = store.get_latest().await {
                    assert!(seq_of(&latest) + 1 >= snapshot.len() as u64);
                }

                last_len = snapshot.len();
                if last_len as u64 == APPENDS {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    let all = store.list_all().await;
    assert_eq!(all.len() as u64, APPENDS);
    assert!(all.iter().enumerate().all(|(i, o)| *o == order(i as u64)));
    assert_eq!(seq_of(&store.get_latest().await.unwrap()), APPENDS - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn read_after_append_observes_it() {
    let store = InMemoryOrderStore::new();

    for seq in 0..100 {
        let writer = store.clone();
        tokio::spawn(async move { writer.append(order(seq)).await })
            .await
            .unwrap();

        let reader = store.clone();
        let latest = tokio::spawn(async move { reader.get_latest().await })
            .await
            .unwrap();
        assert_eq!(latest, Some(order(seq)));
    }
}
