//! Handle for communicating with the zone actor.
//!
//! The `ZoneActorHandle` provides a safe, cloneable interface for sending
//! messages to the zone actor and querying its state.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::{QueryResult, ZoneMessage, ZoneQuery};
use crate::modules::zones::layout::SplitLayout;
use crate::modules::zones::monitor::{MonitorState, PickerOutcome};
use crate::modules::zones::router::ZoneSummary;
use crate::modules::zones::rules::RoutingRule;
use crate::modules::zones::state::{Point, Rect, WindowHandle, ZoneViewMode};

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

    /// The actor answered with a different kind of result.
    #[error("Unexpected query result for {0:?}")]
    UnexpectedResult(ZoneQuery),
}

/// Handle for communicating with the zone actor.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct ZoneActorHandle {
    sender: mpsc::Sender<ZoneMessage>,
}

impl ZoneActorHandle {
    /// Create a new handle with the given sender.
    pub(crate) const fn new(sender: mpsc::Sender<ZoneMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: ZoneMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: ZoneMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// Messages sent earlier from the same handle are handled first, so a
    /// query doubles as a barrier.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: ZoneQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(ZoneMessage::Query { query, respond_to: tx })
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
        query: ZoneQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    async fn query_as<T>(
        &self,
        query: ZoneQuery,
        extract: impl FnOnce(QueryResult) -> Option<T>,
    ) -> Result<T, ActorError> {
        extract(self.query(query).await?).ok_or(ActorError::UnexpectedResult(query))
    }

    // ========================================================================
    // Convenience query methods
    // ========================================================================

    /// Current zones in device pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn zones(&self) -> Result<Vec<(u32, Rect)>, ActorError> {
        self.query_as(ZoneQuery::Zones, QueryResult::into_zones).await
    }

    /// Zone bar data for every zone.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn zone_summaries(&self) -> Result<Vec<ZoneSummary>, ActorError> {
        self.query_as(ZoneQuery::ZoneSummaries, QueryResult::into_summaries).await
    }

    /// Current split layout.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn layout(&self) -> Result<SplitLayout, ActorError> {
        self.query_as(ZoneQuery::Layout, QueryResult::into_layout).await
    }

    /// Current view mode.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn mode(&self) -> Result<ZoneViewMode, ActorError> {
        self.query_as(ZoneQuery::Mode, QueryResult::into_mode).await
    }

    /// Current overlay opacity.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn overlay_opacity(&self) -> Result<f64, ActorError> {
        self.query_as(ZoneQuery::OverlayOpacity, QueryResult::into_opacity).await
    }

    /// Number of windows waiting for the picker.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn pending_pickers(&self) -> Result<usize, ActorError> {
        self.query_as(ZoneQuery::PendingPickers, QueryResult::into_count).await
    }

    /// Monitor state.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn monitor_state(&self) -> Result<MonitorState, ActorError> {
        self.query_as(ZoneQuery::MonitorState, QueryResult::into_monitor).await
    }

    /// Routing rules in lookup order.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn rules(&self) -> Result<Vec<RoutingRule>, ActorError> {
        self.query_as(ZoneQuery::Rules, QueryResult::into_rules).await
    }

    // ========================================================================
    // Convenience command methods
    // ========================================================================

    /// Run one poll cycle now.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn tick(&self) -> Result<(), ActorError> { self.send(ZoneMessage::Tick) }

    /// Answer the zone picker.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn resolve_picker(&self, outcome: PickerOutcome) -> Result<(), ActorError> {
        self.send(ZoneMessage::PickerResolved(outcome))
    }

    /// Switch the view mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn set_mode(&self, mode: ZoneViewMode) -> Result<(), ActorError> {
        self.send(ZoneMessage::SetMode { mode })
    }

    /// Flip between zone and desktop mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn toggle_mode(&self) -> Result<(), ActorError> { self.send(ZoneMessage::ToggleMode) }

    /// Drag a split point.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn move_split_point(&self, index: usize, point: Point) -> Result<(), ActorError> {
        self.send(ZoneMessage::MoveSplitPoint { index, point })
    }

    /// Rename a zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn rename_zone(&self, zone_id: u32, name: impl Into<String>) -> Result<(), ActorError> {
        self.send(ZoneMessage::RenameZone { zone_id, name: name.into() })
    }

    /// Send the foreground window to a zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn send_foreground_to_zone(&self, zone_id: u32) -> Result<(), ActorError> {
        self.send(ZoneMessage::SendForegroundToZone { zone_id })
    }

    /// Bring a zone member to the front.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has stopped.
    pub fn focus_window(&self, handle: WindowHandle) -> Result<(), ActorError> {
        self.send(ZoneMessage::FocusWindow { handle })
    }

    /// Stop the actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has already stopped.
    pub fn shutdown(&self) -> Result<(), ActorError> { self.send(ZoneMessage::Shutdown) }

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

impl std::fmt::Debug for ZoneActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneActorHandle")
            .field("alive", &self.is_alive())
            .field("pending", &self.pending_messages())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_closed_detection() {
        let (tx, rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);
        assert!(handle.is_alive());

        drop(rx);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_send_to_closed_channel() {
        let (tx, rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);
        drop(rx);

        assert!(matches!(handle.tick(), Err(ActorError::SendFailed)));
        assert!(matches!(handle.mode().await, Err(ActorError::SendFailed)));
    }

    #[tokio::test]
    async fn test_query_with_dropped_responder() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);

        let responder = tokio::spawn(async move {
            if let Some(ZoneMessage::Query { respond_to, .. }) = rx.recv().await {
                drop(respond_to);
            }
        });

        assert!(matches!(handle.mode().await, Err(ActorError::ReceiveFailed)));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_unexpected_result() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);

        tokio::spawn(async move {
            if let Some(ZoneMessage::Query { respond_to, .. }) = rx.recv().await {
                let _ = respond_to.send(QueryResult::Count(1));
            }
        });

        assert!(matches!(
            handle.mode().await,
            Err(ActorError::UnexpectedResult(ZoneQuery::Mode))
        ));
    }

    #[tokio::test]
    async fn test_query_timeout() {
        let (tx, _rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);

        let result = handle.query_timeout(ZoneQuery::Mode, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(ActorError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_pending_messages() {
        let (tx, _rx) = mpsc::channel(16);
        let handle = ZoneActorHandle::new(tx);

        handle.tick().unwrap();
        handle.toggle_mode().unwrap();
        assert_eq!(handle.pending_messages(), 2);
    }
}
