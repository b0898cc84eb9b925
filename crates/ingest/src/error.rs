//! Ingestion error types.

use thiserror::Error;

/// Errors that end a broker session.
///
/// Payload decode failures are not represented here: they are handled per
/// message and never terminate the loop.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An AMQP protocol or connection error.
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    /// A broker-specific error from a non-AMQP broker.
    #[error("Broker error: {0}")]
    Broker(String),

    /// The broker ended the delivery stream.
    #[error("Delivery stream closed by broker")]
    StreamClosed,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
