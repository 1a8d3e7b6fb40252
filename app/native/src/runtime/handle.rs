//! Handle for communicating with the dock actor.
//!
//! The `DockHandle` provides a cloneable interface for sending messages to the
//! dock actor and reading its published state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use super::messages::{DockMessage, DockQuery, DockSnapshot, QueryResult};
use crate::dock::{DockSignal, HostEvent};

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The actor answered with a result of the wrong kind.
    #[error("Unexpected query result")]
    UnexpectedResult,
}

/// Handle for communicating with the dock actor.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct DockHandle {
    sender: mpsc::Sender<DockMessage>,
    snapshot: Arc<RwLock<DockSnapshot>>,
}

impl DockHandle {
    pub(crate) const fn new(
        sender: mpsc::Sender<DockMessage>,
        snapshot: Arc<RwLock<DockSnapshot>>,
    ) -> Self {
        Self { sender, snapshot }
    }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: DockMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: DockMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Forward a host notification.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn post(&self, event: HostEvent) -> Result<(), ActorError> { self.send(DockMessage::Host(event)) }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: DockQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(DockMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Execute a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(
        &self,
        query: DockQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// Signals recorded since the last drain.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn drain_signals(&self) -> Result<Vec<DockSignal>, ActorError> {
        self.query(DockQuery::DrainSignals)
            .await?
            .into_signals()
            .ok_or(ActorError::UnexpectedResult)
    }

    /// Whether docks are enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn is_enabled(&self) -> Result<bool, ActorError> {
        self.query(DockQuery::Enabled).await?.into_enabled().ok_or(ActorError::UnexpectedResult)
    }

    /// Last state published by the actor. Never blocks on the actor.
    #[must_use]
    pub fn snapshot(&self) -> DockSnapshot { self.snapshot.read().clone() }

    // ========================================================================
    // Commands
    // ========================================================================

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn enable(&self) -> Result<(), ActorError> { self.send(DockMessage::Enable) }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn disable(&self) -> Result<(), ActorError> { self.send(DockMessage::Disable) }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn show(&self, monitor: usize, animate: bool) -> Result<(), ActorError> {
        self.send(DockMessage::Show { monitor, animate })
    }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn hide(&self, monitor: usize, animate: bool) -> Result<(), ActorError> {
        self.send(DockMessage::Hide { monitor, animate })
    }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn block_autohide(&self, monitor: usize, block: bool) -> Result<(), ActorError> {
        self.send(DockMessage::BlockAutohide { monitor, block })
    }

    /// Stop the actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn shutdown(&self) -> Result<(), ActorError> { self.send(DockMessage::Shutdown) }

    // ========================================================================
    // Status
    // ========================================================================

    /// Check if the actor is still running (channel is open).
    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }

    /// Get the number of messages waiting in the queue.
    #[must_use]
    pub fn pending_messages(&self) -> usize { self.sender.max_capacity() - self.sender.capacity() }
}

impl std::fmt::Debug for DockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockHandle")
            .field("alive", &self.is_alive())
            .field("pending", &self.pending_messages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (DockHandle, mpsc::Receiver<DockMessage>) {
        let (tx, rx) = mpsc::channel(16);
        (DockHandle::new(tx, Arc::default()), rx)
    }

    #[tokio::test]
    async fn test_handle_closed_detection() {
        let (handle, rx) = handle();
        assert!(handle.is_alive());

        drop(rx);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_send_to_closed_channel() {
        let (handle, rx) = handle();
        drop(rx);

        assert!(matches!(handle.shutdown(), Err(ActorError::SendFailed)));
        assert!(matches!(handle.query(DockQuery::Enabled).await, Err(ActorError::SendFailed)));
    }

    #[tokio::test]
    async fn test_pending_messages() {
        let (handle, mut rx) = handle();
        handle.enable().unwrap();
        handle.post(HostEvent::Restacked).unwrap();
        assert_eq!(handle.pending_messages(), 2);

        assert!(matches!(rx.recv().await, Some(DockMessage::Enable)));
        assert_eq!(handle.pending_messages(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_timeout() {
        let (handle, _rx) = handle();
        let result = handle.query_timeout(DockQuery::Snapshot, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ActorError::Timeout(_))));
    }

    #[test]
    fn test_snapshot_defaults_to_disabled() {
        let (handle, _rx) = handle();
        assert!(!handle.snapshot().enabled);
    }
}
