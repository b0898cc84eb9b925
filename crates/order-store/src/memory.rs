use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Order, store::OrderStore};

/// In-memory order store.
///
/// Orders live behind a single read-write lock: an append holds the write
/// lock for one `Vec::push`, a snapshot holds the read lock for one clone of
/// the backing vector. Cloning the store clones the handle, not the data.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn append(&self, order: Order) -> usize {
        let size = {
            let mut orders = self.orders.write().await;
            orders.push(order);
            orders.len()
        };

        metrics::gauge!("order_store_size").set(size as f64);
        tracing::debug!(size, "order appended");

        size
    }

    async fn list_all(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    async fn get_latest(&self) -> Option<Order> {
        self.orders.read().await.last().cloned()
    }

    async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}
