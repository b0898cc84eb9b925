//! RabbitMQ broker backed by lapin.

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer};

use crate::Result;
use crate::broker::{Broker, BrokerSession, Delivery};

/// Queue consumed when none is configured.
pub const DEFAULT_QUEUE: &str = "order_queue";

const CONSUMER_TAG: &str = "order-feed";
const REPLY_SUCCESS: u16 = 200;

/// AMQP 0.9.1 broker.
///
/// Each [`connect`](Broker::connect) opens a fresh connection and channel,
/// declares the (non-durable) queue and starts a manual-ack consumer on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmqpBroker {
    uri: String,
    queue: String,
    prefetch: Option<u16>,
}

impl AmqpBroker {
    /// Creates a broker for the given AMQP URI consuming from `order_queue`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            queue: DEFAULT_QUEUE.to_string(),
            prefetch: None,
        }
    }

    /// Sets the queue to consume from.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Limits the number of unacknowledged deliveries in flight.
    pub fn with_prefetch(mut self, prefetch: u16) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    /// Returns the queue this broker consumes from.
    pub fn queue(&self) -> &str {
        &self.queue
    }
}

/// Connection properties that run lapin's I/O on the current tokio runtime.
///
/// Must be called from within a tokio runtime.
pub fn connection_properties() -> ConnectionProperties {
    ConnectionProperties::default()
        .with_executor(tokio_executor_trait::Tokio::current())
        .with_reactor(tokio_reactor_trait::Tokio)
}

#[async_trait]
impl Broker for AmqpBroker {
    #[tracing::instrument(skip(self), fields(queue = %self.queue))]
    async fn connect(&self) -> Result<Box<dyn BrokerSession>> {
        let connection = Connection::connect(&self.uri, connection_properties()).await?;
        let channel = connection.create_channel().await?;

        if let Some(prefetch) = self.prefetch {
            channel
                .basic_qos(prefetch, BasicQosOptions::default())
                .await?;
        }

        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: false,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        let consumer = channel
            .basic_consume(
                &self.queue,
                CONSUMER_TAG,
                BasicConsumeOptions {
                    no_ack: false,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        tracing::info!("connected to broker");

        Ok(Box::new(AmqpSession {
            connection,
            channel,
            consumer,
        }))
    }
}

struct AmqpSession {
    connection: Connection,
    channel: Channel,
    consumer: Consumer,
}

#[async_trait]
impl BrokerSession for AmqpSession {
    async fn next_delivery(&mut self) -> Option<Result<Delivery>> {
        let delivery = self.consumer.next().await?;
        Some(
            delivery
                .map(|d| Delivery {
                    delivery_tag: d.delivery_tag,
                    payload: d.data,
                    redelivered: d.redelivered,
                })
                .map_err(Into::into),
        )
    }

    async fn ack(&mut self, delivery_tag: u64) -> Result<()> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // Closing the connection closes its channels and cancels the consumer.
        self.connection.close(REPLY_SUCCESS, "OK").await?;
        tracing::info!("broker connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_order_queue() {
        let broker = AmqpBroker::new("amqp://localhost");
        assert_eq!(broker.queue(), "order_queue");
        assert_eq!(broker.prefetch, None);
    }

    #[test]
    fn builder_overrides() {
        let broker = AmqpBroker::new("amqp://localhost")
            .with_queue("priority_orders")
            .with_prefetch(16);
        assert_eq!(broker.queue(), "priority_orders");
        assert_eq!(broker.prefetch, Some(16));
    }

    #[tokio::test]
    async fn connection_properties_run_on_tokio() {
        let properties = connection_properties();
        assert!(properties.executor.is_some());
        assert!(properties.reactor.is_some());
    }

    #[tokio::test]
    async fn connect_to_unreachable_broker_fails() {
        let broker = AmqpBroker::new("amqp://127.0.0.1:1");
        let result = broker.connect().await;
        assert!(matches!(result, Err(crate::IngestError::Amqp(_))));
    }
}
