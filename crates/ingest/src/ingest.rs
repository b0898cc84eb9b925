//! The ingest loop: broker -> decode -> store -> ack.

use order_store::{Order, OrderStore};
use tokio::sync::watch;

use crate::broker::{Broker, BrokerSession, Delivery};
use crate::policy::ReconnectPolicy;
use crate::status::{IngestState, IngestStatus, StatusPublisher};
use crate::{IngestError, Result};

/// How the ingest loop ended.
#[derive(Debug)]
pub enum IngestOutcome {
    /// A shutdown was requested; the broker connection was closed.
    Stopped,
    /// The broker connection failed and the reconnect policy gave up.
    Failed(IngestError),
}

/// Consumes deliveries from a broker and appends the decoded orders to a store.
///
/// The loop is the store's only writer. For every delivery it:
/// 1. decodes the payload as a JSON object,
/// 2. appends the order to the store,
/// 3. acknowledges the delivery.
///
/// Payloads that fail to decode are logged and acknowledged without being
/// stored, so a poison message can never stall the queue. Broker errors end
/// the session; whether a new one is opened is up to the [`ReconnectPolicy`].
pub struct IngestLoop<S: OrderStore, B: Broker> {
    store: S,
    broker: B,
    policy: ReconnectPolicy,
    status: StatusPublisher,
}

impl<S: OrderStore, B: Broker> IngestLoop<S, B> {
    /// Creates a fail-fast loop feeding `store` from `broker`.
    pub fn new(store: S, broker: B) -> Self {
        Self {
            store,
            broker,
            policy: ReconnectPolicy::default(),
            status: StatusPublisher::new(),
        }
    }

    /// Sets the policy applied when the broker connection fails.
    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns a handle for observing the loop's connection state.
    pub fn status(&self) -> IngestStatus {
        self.status.subscribe()
    }

    /// Runs until `shutdown` turns true or the broker connection is lost for good.
    ///
    /// Dropping the shutdown sender without sending `true` leaves the loop
    /// running.
    #[tracing::instrument(skip_all)]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> IngestOutcome {
        let mut attempt = 0;

        loop {
            let err = match self.run_session(&mut shutdown).await {
                Ok(()) => {
                    self.status.transition(IngestState::Stopped);
                    tracing::info!("order ingestion stopped");
                    return IngestOutcome::Stopped;
                }
                Err(err) => err,
            };

            metrics::counter!("ingest_connection_failures").increment(1);
            tracing::error!(error = %err, "lost connection to broker");
            self.status.record_error(&err);

            let Some(delay) = self.policy.next_delay(attempt) else {
                self.status.transition(IngestState::Failed);
                tracing::error!("order ingestion stopped, no reconnect allowed");
                return IngestOutcome::Failed(err);
            };

            attempt += 1;
            self.status.transition(IngestState::Disconnected);
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "reconnecting to broker"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = shutdown_requested(&mut shutdown) => {
                    self.status.transition(IngestState::Stopped);
                    tracing::info!("order ingestion stopped while waiting to reconnect");
                    return IngestOutcome::Stopped;
                }
            }
            self.status.record_reconnect();
        }
    }

    /// Connects once and consumes until shutdown (Ok) or a broker error (Err).
    async fn run_session(&self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        self.status.transition(IngestState::Connecting);

        let mut session = tokio::select! {
            connected = self.broker.connect() => connected?,
            () = shutdown_requested(shutdown) => return Ok(()),
        };

        self.status.transition(IngestState::Consuming);
        tracing::info!("started consuming orders");

        let result = self.consume(session.as_mut(), shutdown).await;

        if let Err(err) = session.close().await {
            tracing::warn!(error = %err, "failed to close broker connection");
        }

        result
    }

    async fn consume(
        &self,
        session: &mut dyn BrokerSession,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        loop {
            let delivery = tokio::select! {
                biased;
                () = shutdown_requested(shutdown) => return Ok(()),
                next = session.next_delivery() => match next {
                    Some(delivery) => delivery?,
                    None => return Err(IngestError::StreamClosed),
                },
            };

            self.handle_delivery(session, delivery).await?;
        }
    }

    async fn handle_delivery(
        &self,
        session: &mut dyn BrokerSession,
        delivery: Delivery,
    ) -> Result<()> {
        let delivery_tag = delivery.delivery_tag;

        match Order::from_slice(&delivery.payload) {
            Ok(order) => {
                let size = self.store.append(order).await;
                metrics::counter!("ingest_orders_received").increment(1);
                tracing::info!(delivery_tag, size, "received order");
            }
            Err(err) => {
                metrics::counter!("ingest_decode_failures").increment(1);
                tracing::error!(
                    delivery_tag,
                    redelivered = delivery.redelivered,
                    payload_len = delivery.payload.len(),
                    error = %err,
                    "dropping undecodable order payload"
                );
            }
        }

        session.ack(delivery_tag).await
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
