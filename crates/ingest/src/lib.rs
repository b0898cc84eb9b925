//! Order ingestion from a message broker.
//!
//! This crate owns the write side of the order feed:
//! - [`Broker`] / [`BrokerSession`] traits isolating connect and consume
//! - [`AmqpBroker`] for RabbitMQ and [`InMemoryBroker`] for tests
//! - [`IngestLoop`], the single writer that decodes deliveries, appends them
//!   to an [`OrderStore`](order_store::OrderStore) and acknowledges them
//! - [`IngestStatus`] for observing the loop's connection state

pub mod amqp;
pub mod broker;
pub mod error;
pub mod ingest;
pub mod memory;
pub mod policy;
pub mod status;

pub use amqp::AmqpBroker;
pub use broker::{Broker, BrokerSession, Delivery};
pub use error::{IngestError, Result};
pub use ingest::{IngestLoop, IngestOutcome};
pub use memory::InMemoryBroker;
pub use policy::ReconnectPolicy;
pub use status::{IngestSnapshot, IngestState, IngestStatus};
