//! Application configuration loaded from environment variables.

use std::time::Duration;

use ingest::{AmqpBroker, ReconnectPolicy};

/// Process configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `5000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `RABBITMQ_CONNECTION_STRING` — AMQP URI (default: `"amqp://localhost"`)
/// - `ORDER_QUEUE` — queue to consume (default: `"order_queue"`)
/// - `INGEST_MAX_RECONNECTS` — reconnect attempts after a broker failure (default: `0`)
/// - `INGEST_RECONNECT_DELAY_MS` — delay between reconnect attempts (default: `1000`)
/// - `INGEST_PREFETCH` — max unacknowledged deliveries in flight (default: unlimited)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub broker_url: String,
    pub queue: String,
    pub max_reconnects: u32,
    pub reconnect_delay: Duration,
    pub prefetch: Option<u16>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            broker_url: lookup("RABBITMQ_CONNECTION_STRING").unwrap_or(defaults.broker_url),
            queue: lookup("ORDER_QUEUE").unwrap_or(defaults.queue),
            max_reconnects: lookup("INGEST_MAX_RECONNECTS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_reconnects),
            reconnect_delay: lookup("INGEST_RECONNECT_DELAY_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnect_delay),
            prefetch: lookup("INGEST_PREFETCH")
                .and_then(|n| n.parse().ok())
                .filter(|&n: &u16| n > 0)
                .or(defaults.prefetch),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the AMQP broker the ingest loop consumes from.
    pub fn broker(&self) -> AmqpBroker {
        let broker = AmqpBroker::new(self.broker_url.clone()).with_queue(self.queue.clone());
        match self.prefetch {
            Some(prefetch) => broker.with_prefetch(prefetch),
            None => broker,
        }
    }

    /// Returns the reconnect policy for the ingest loop.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::from_limits(self.max_reconnects, self.reconnect_delay)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
            broker_url: "amqp://localhost".to_string(),
            queue: ingest::amqp::DEFAULT_QUEUE.to_string(),
            max_reconnects: 0,
            reconnect_delay: Duration::from_millis(1000),
            prefetch: None,
        }
    }
}
