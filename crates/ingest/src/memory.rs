//! In-memory broker for tests and local development.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::broker::{Broker, BrokerSession, Delivery};
use crate::{IngestError, Result};

enum Envelope {
    Message(Delivery),
    Fail(String),
    Close,
}

struct Inner {
    sender: mpsc::UnboundedSender<Envelope>,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Envelope>>>,
    next_tag: AtomicU64,
    pending_connect_failures: Mutex<u32>,
    pending_ack_failure: Mutex<Option<String>>,
    connect_attempts: AtomicU32,
    sessions_closed: AtomicU32,
    acked: watch::Sender<Vec<u64>>,
}

/// In-memory broker with a single queue.
///
/// Messages published before or after a session connects are delivered in
/// publish order. Acknowledgements are recorded and can be awaited, and
/// connection failures can be injected both at connect time and mid-stream.
///
/// Cloning the broker clones the handle; all clones share one queue.
#[derive(Clone)]
pub struct InMemoryBroker {
    inner: Arc<Inner>,
}

impl InMemoryBroker {
    /// Creates a new broker with an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (acked, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                sender,
                receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
                next_tag: AtomicU64::new(1),
                pending_connect_failures: Mutex::new(0),
                pending_ack_failure: Mutex::new(None),
                connect_attempts: AtomicU32::new(0),
                sessions_closed: AtomicU32::new(0),
                acked,
            }),
        }
    }

    /// Publishes a message and returns the delivery tag assigned to it.
    pub fn publish(&self, payload: impl Into<Vec<u8>>) -> u64 {
        let tag = self.inner.next_tag.fetch_add(1, Ordering::SeqCst);
        // The receiver lives as long as `inner`, so sending cannot fail.
        let _ = self
            .inner
            .sender
            .send(Envelope::Message(Delivery::new(tag, payload)));
        tag
    }

    /// Makes the active session fail with the given reason once every
    /// previously published message has been delivered.
    pub fn inject_failure(&self, reason: impl Into<String>) {
        let _ = self.inner.sender.send(Envelope::Fail(reason.into()));
    }

    /// Ends the delivery stream once every previously published message has
    /// been delivered.
    pub fn close_stream(&self) {
        let _ = self.inner.sender.send(Envelope::Close);
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        if let Ok(mut pending) = self.inner.pending_connect_failures.lock() {
            *pending = count;
        }
    }

    /// Makes the next acknowledgement fail with the given reason.
    ///
    /// The failed delivery is not recorded as acked.
    pub fn fail_next_ack(&self, reason: impl Into<String>) {
        if let Ok(mut pending) = self.inner.pending_ack_failure.lock() {
            *pending = Some(reason.into());
        }
    }

    /// Returns how many times a connection was attempted.
    pub fn connect_attempts(&self) -> u32 {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }

    /// Returns how many sessions were closed by their consumer.
    pub fn sessions_closed(&self) -> u32 {
        self.inner.sessions_closed.load(Ordering::SeqCst)
    }

    /// Returns every acknowledged delivery tag, in acknowledgement order.
    pub fn acked(&self) -> Vec<u64> {
        self.inner.acked.borrow().clone()
    }

    /// Waits until at least `count` deliveries have been acknowledged.
    pub async fn wait_for_acks(&self, count: usize) {
        let mut acked = self.inner.acked.subscribe();
        // The sender lives as long as `self`, so waiting cannot fail.
        let _ = acked.wait_for(|tags| tags.len() >= count).await;
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn connect(&self) -> Result<Box<dyn BrokerSession>> {
        self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = match self.inner.pending_connect_failures.lock() {
            Ok(mut pending) if *pending > 0 => {
                *pending -= 1;
                true
            }
            _ => false,
        };
        if should_fail {
            return Err(IngestError::Broker("connection refused".to_string()));
        }

        Ok(Box::new(InMemorySession {
            inner: Arc::clone(&self.inner),
            closed: false,
        }))
    }
}

struct InMemorySession {
    inner: Arc<Inner>,
    closed: bool,
}

#[async_trait]
impl BrokerSession for InMemorySession {
    async fn next_delivery(&mut self) -> Option<Result<Delivery>> {
        if self.closed {
            return None;
        }

        let mut receiver = self.inner.receiver.lock().await;
        match receiver.recv().await? {
            Envelope::Message(delivery) => Some(Ok(delivery)),
            Envelope::Fail(reason) => Some(Err(IngestError::Broker(reason))),
            Envelope::Close => {
                self.closed = true;
                None
            }
        }
    }

    async fn ack(&mut self, delivery_tag: u64) -> Result<()> {
        let failure = match self.inner.pending_ack_failure.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        if let Some(reason) = failure {
            return Err(IngestError::Broker(reason));
        }

        self.inner.acked.send_modify(|tags| tags.push(delivery_tag));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.inner.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
