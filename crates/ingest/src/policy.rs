//! Reconnect policies for the ingest loop.

use std::time::Duration;

/// What the ingest loop does after losing its broker connection.
///
/// The default is [`ReconnectPolicy::Never`]: the loop ends on the first
/// connection failure and the query side keeps serving what was ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Fail fast: never reconnect.
    #[default]
    Never,
    /// Reconnect after a fixed delay, at most `max_attempts` times over the
    /// lifetime of the loop.
    Fixed { delay: Duration, max_attempts: u32 },
}

impl ReconnectPolicy {
    /// Builds a policy from a maximum attempt count and a delay.
    ///
    /// Zero attempts means [`ReconnectPolicy::Never`].
    pub fn from_limits(max_attempts: u32, delay: Duration) -> Self {
        if max_attempts == 0 {
            ReconnectPolicy::Never
        } else {
            ReconnectPolicy::Fixed {
                delay,
                max_attempts,
            }
        }
    }

    /// Returns the delay before reconnect attempt number `attempt`
    /// (zero-based), or None if no further attempt is allowed.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Fixed {
                delay,
                max_attempts,
            } => (attempt < max_attempts).then_some(delay),
        }
    }
}
