//! Connection state of the ingest loop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// Lifecycle state of the ingest loop.
///
/// `Disconnected -> Connecting -> Consuming`, ending in either `Failed`
/// (the broker connection was lost and no reconnect was allowed) or
/// `Stopped` (clean shutdown). Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestState {
    Disconnected,
    Connecting,
    Consuming,
    Failed,
    Stopped,
}

impl IngestState {
    /// Returns true if the loop has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestState::Failed | IngestState::Stopped)
    }
}

impl std::fmt::Display for IngestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestState::Disconnected => "disconnected",
            IngestState::Connecting => "connecting",
            IngestState::Consuming => "consuming",
            IngestState::Failed => "failed",
            IngestState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of the ingest loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSnapshot {
    pub state: IngestState,
    /// When the loop entered `state`.
    pub since: DateTime<Utc>,
    /// Most recent connection error, kept across reconnects.
    pub last_error: Option<String>,
    /// Number of reconnect attempts made so far.
    pub reconnects: u32,
}

impl IngestSnapshot {
    fn initial() -> Self {
        Self {
            state: IngestState::Disconnected,
            since: Utc::now(),
            last_error: None,
            reconnects: 0,
        }
    }
}

/// Read-only handle on the ingest loop's state.
///
/// Cheap to clone; handlers hold one to report ingest health without ever
/// touching the broker.
#[derive(Debug, Clone)]
pub struct IngestStatus {
    receiver: watch::Receiver<IngestSnapshot>,
}

impl IngestStatus {
    /// Returns the latest snapshot.
    pub fn current(&self) -> IngestSnapshot {
        self.receiver.borrow().clone()
    }

    /// Returns the latest state.
    pub fn state(&self) -> IngestState {
        self.receiver.borrow().state
    }

    /// Waits until the loop reaches a state matching `predicate`.
    ///
    /// Returns the matching snapshot, or the last known one if the loop was
    /// dropped first.
    pub async fn wait_for(&mut self, predicate: impl Fn(IngestState) -> bool) -> IngestSnapshot {
        if let Ok(snapshot) = self.receiver.wait_for(|s| predicate(s.state)).await {
            return snapshot.clone();
        }
        self.current()
    }
}

/// Write side of the status channel, owned by the ingest loop.
#[derive(Debug)]
pub(crate) struct StatusPublisher {
    sender: watch::Sender<IngestSnapshot>,
}

impl StatusPublisher {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(IngestSnapshot::initial());
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> IngestStatus {
        IngestStatus {
            receiver: self.sender.subscribe(),
        }
    }

    pub(crate) fn transition(&self, state: IngestState) {
        self.sender.send_modify(|s| {
            s.state = state;
            s.since = Utc::now();
        });
        tracing::debug!(%state, "ingest state changed");
    }

    pub(crate) fn record_error(&self, error: &crate::IngestError) {
        self.sender
            .send_modify(|s| s.last_error = Some(error.to_string()));
    }

    pub(crate) fn record_reconnect(&self) {
        self.sender.send_modify(|s| s.reconnects += 1);
    }
}
