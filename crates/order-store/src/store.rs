use async_trait::async_trait;

use crate::Order;

/// Core trait for order store implementations.
///
/// A store is an append-only sequence of orders shared between exactly one
/// writer (the ingest loop) and any number of concurrent readers (request
/// handlers). All implementations must be thread-safe (Send + Sync).
///
/// Implementations must guarantee that:
/// - appends are atomic from a reader's point of view,
/// - the size never decreases,
/// - a read that starts after an append returns observes that append.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Appends an order as the new last element.
    ///
    /// Returns the size of the store after the append. Callers must not
    /// issue concurrent appends.
    async fn append(&self, order: Order) -> usize;

    /// Returns a snapshot of every order appended so far, in insertion order.
    async fn list_all(&self) -> Vec<Order>;

    /// Returns the most recently appended order.
    ///
    /// Returns None if the store is empty.
    async fn get_latest(&self) -> Option<Order>;

    /// Returns the number of orders stored.
    async fn len(&self) -> usize;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Returns true if no order has been appended yet.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
