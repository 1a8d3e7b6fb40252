//! Message types for the dock actor.
//!
//! All communication with the dock actor happens through messages:
//! - `DockMessage` - host events and commands sent to the actor
//! - `DockQuery` - requests for state data (with response channel)
//! - `QueryResult` - responses from queries

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::dock::{
    DockSignal, HostEvent, OverlapStatus, PanelVisualState, Rect, SuppressionFlags,
};

// ============================================================================
// Dock Messages
// ============================================================================

/// Messages sent to the dock actor.
#[derive(Debug)]
pub enum DockMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Host Events (from the compositor integration and the actor's own timers)
    // ════════════════════════════════════════════════════════════════════════
    /// A host notification to route through the dock manager.
    Host(HostEvent),

    // ════════════════════════════════════════════════════════════════════════
    // Commands
    // ════════════════════════════════════════════════════════════════════════
    /// Build docks for the current topology.
    Enable,

    /// Tear down every dock and ignore host events until re-enabled.
    Disable,

    /// Show the dock on a monitor.
    Show { monitor: usize, animate: bool },

    /// Hide the dock on a monitor.
    Hide { monitor: usize, animate: bool },

    /// Block or unblock autohide on a monitor.
    BlockAutohide { monitor: usize, block: bool },

    // ════════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════════
    /// Query state with a response channel.
    Query {
        query: DockQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    // ════════════════════════════════════════════════════════════════════════
    // Internal
    // ════════════════════════════════════════════════════════════════════════
    /// Stop the actor.
    Shutdown,
}

impl DockMessage {
    /// Returns the message name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Host(event) => event.name(),
            Self::Enable => "Enable",
            Self::Disable => "Disable",
            Self::Show { .. } => "Show",
            Self::Hide { .. } => "Hide",
            Self::BlockAutohide { .. } => "BlockAutohide",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries for reading dock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockQuery {
    /// Current state of every dock.
    Snapshot,
    /// Signals recorded since the last drain.
    DrainSignals,
    /// Whether docks are enabled.
    Enabled,
}

/// Results from queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Snapshot(DockSnapshot),
    Signals(Vec<DockSignal>),
    Enabled(bool),
}

impl QueryResult {
    /// Try to get the snapshot from the result.
    #[must_use]
    pub fn into_snapshot(self) -> Option<DockSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Try to get signals from the result.
    #[must_use]
    pub fn into_signals(self) -> Option<Vec<DockSignal>> {
        match self {
            Self::Signals(signals) => Some(signals),
            _ => None,
        }
    }

    /// Try to get the enabled state from the result.
    #[must_use]
    pub fn into_enabled(self) -> Option<bool> {
        match self {
            Self::Enabled(enabled) => Some(enabled),
            _ => None,
        }
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// State of a single dock, as seen from outside the actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockState {
    pub monitor: usize,
    pub visibility: PanelVisualState,
    pub overlap: OverlapStatus,
    pub flags: SuppressionFlags,
    pub target_box: Option<Rect>,
}

/// State of every dock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockSnapshot {
    pub enabled: bool,
    pub docks: Vec<DockState>,
}

impl DockSnapshot {
    /// State of the dock on `monitor`, if it has one.
    #[must_use]
    pub fn dock(&self, monitor: usize) -> Option<&DockState> {
        self.docks.iter().find(|d| d.monitor == monitor)
    }
}
