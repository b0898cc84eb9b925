//! Broker abstraction used by the ingest loop.

use async_trait::async_trait;

use crate::Result;

/// A single message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Broker-assigned tag used to acknowledge this delivery.
    pub delivery_tag: u64,
    /// Raw message body.
    pub payload: Vec<u8>,
    /// Whether the broker has delivered this message before.
    pub redelivered: bool,
}

impl Delivery {
    /// Creates a first-time delivery with the given tag and payload.
    pub fn new(delivery_tag: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            delivery_tag,
            payload: payload.into(),
            redelivered: false,
        }
    }
}

/// Something the ingest loop can connect to and consume from.
///
/// Connecting yields a [`BrokerSession`] subscribed to a single queue with
/// explicit acknowledgements. Reconnect policies are layered on top of this
/// trait by the ingest loop, never inside implementations.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Opens a connection and subscribes to the configured queue.
    async fn connect(&self) -> Result<Box<dyn BrokerSession>>;
}

/// A live subscription to a broker queue.
#[async_trait]
pub trait BrokerSession: Send {
    /// Waits for the next delivery.
    ///
    /// Returns None once the broker has ended the stream. Must be cancel-safe:
    /// dropping the future before it completes must not lose a delivery.
    async fn next_delivery(&mut self) -> Option<Result<Delivery>>;

    /// Acknowledges a single delivery by tag.
    async fn ack(&mut self, delivery_tag: u64) -> Result<()>;

    /// Closes the subscription and the underlying connection.
    async fn close(&mut self) -> Result<()>;
}
