//! Read-only window views consumed by the dock engine.
//!
//! The window manager owns window lifecycles. The dock only ever sees fresh
//! snapshots taken at the moment it reacts to an event.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

// ============================================================================
// Identifiers
// ============================================================================

/// Window identifier assigned by the window manager.
pub type WindowId = u64;

/// Workspace identifier assigned by the window manager.
pub type WorkspaceId = u32;

// ============================================================================
// Window Type
// ============================================================================

/// Window type classification, following the EWMH window type set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    #[default]
    Normal,
    Desktop,
    Dock,
    Dialog,
    ModalDialog,
    Toolbar,
    Menu,
    Utility,
    Splashscreen,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
    OverrideOther,
}

/// Window types that can hide the dock by overlapping it.
///
/// Everything else (desktop background, notifications, tooltips, transient
/// popups) is ignored even when it covers the dock area.
pub const HANDLED_WINDOW_TYPES: [WindowType; 8] = [
    WindowType::Normal,
    WindowType::Dock,
    WindowType::Dialog,
    WindowType::ModalDialog,
    WindowType::Toolbar,
    WindowType::Menu,
    WindowType::Utility,
    WindowType::Splashscreen,
];

impl WindowType {
    /// Returns whether this window type participates in overlap detection.
    #[must_use]
    pub fn is_handled(self) -> bool { HANDLED_WINDOW_TYPES.contains(&self) }
}

// ============================================================================
// Window Snapshot
// ============================================================================

/// A point-in-time view of a live window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    /// The window ID.
    pub id: WindowId,
    /// The frame rectangle (decorations included).
    pub frame: Rect,
    /// Index of the monitor the window is assigned to.
    pub monitor: usize,
    /// Workspace membership. `None` means the window is on all workspaces.
    #[serde(default)]
    pub workspace: Option<WorkspaceId>,
    /// Whether the window is showing on its own workspace.
    #[serde(default = "default_true")]
    pub showing_on_its_workspace: bool,
    /// Whether the window is minimized.
    #[serde(default)]
    pub minimized: bool,
    /// Window type classification.
    #[serde(default)]
    pub window_type: WindowType,
    /// Whether this is the focused window.
    #[serde(default)]
    pub focused: bool,
}

const fn default_true() -> bool { true }

impl WindowSnapshot {
    /// Creates a visible, unminimized normal window.
    #[must_use]
    pub const fn new(id: WindowId, frame: Rect, monitor: usize) -> Self {
        Self {
            id,
            frame,
            monitor,
            workspace: None,
            showing_on_its_workspace: true,
            minimized: false,
            window_type: WindowType::Normal,
            focused: false,
        }
    }

    /// Returns whether this window can collide with a dock on `monitor`.
    ///
    /// Workspace filtering for the primary monitor is applied separately
    /// because it depends on the active workspace.
    #[must_use]
    pub fn is_candidate_for(&self, monitor: usize) -> bool {
        self.monitor == monitor
            && self.showing_on_its_workspace
            && !self.minimized
            && self.window_type.is_handled()
    }

    /// Returns whether the window belongs to `active` (sticky windows always do).
    #[must_use]
    pub fn is_on_workspace(&self, active: Option<WorkspaceId>) -> bool {
        match (self.workspace, active) {
            (None, _) => true,
            (Some(own), Some(active)) => own == active,
            (Some(_), None) => false,
        }
    }
}

// ============================================================================
// Grab Operations
// ============================================================================

/// The type of pointer grab operation reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrabOp {
    /// Window is being moved.
    Moving,
    /// Window is being resized.
    Resizing,
    /// Any other grab (keyboard move, compositor grabs).
    Other,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handled_window_types() {
        assert!(WindowType::Normal.is_handled());
        assert!(WindowType::ModalDialog.is_handled());
        assert!(WindowType::Splashscreen.is_handled());
        assert!(!WindowType::Desktop.is_handled());
        assert!(!WindowType::Notification.is_handled());
        assert!(!WindowType::Tooltip.is_handled());
        assert!(!WindowType::PopupMenu.is_handled());
    }

    #[test]
    fn test_candidate_filters() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        let window = WindowSnapshot::new(1, frame, 0);
        assert!(window.is_candidate_for(0));
        assert!(!window.is_candidate_for(1));

        let minimized = WindowSnapshot { minimized: true, ..window.clone() };
        assert!(!minimized.is_candidate_for(0));

        let hidden = WindowSnapshot {
            showing_on_its_workspace: false,
            ..window.clone()
        };
        assert!(!hidden.is_candidate_for(0));

        let desktop = WindowSnapshot {
            window_type: WindowType::Desktop,
            ..window
        };
        assert!(!desktop.is_candidate_for(0));
    }

    #[test]
    fn test_workspace_membership() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        let sticky = WindowSnapshot::new(1, frame, 0);
        assert!(sticky.is_on_workspace(Some(3)));
        assert!(sticky.is_on_workspace(None));

        let pinned = WindowSnapshot { workspace: Some(2), ..sticky };
        assert!(pinned.is_on_workspace(Some(2)));
        assert!(!pinned.is_on_workspace(Some(3)));
        assert!(!pinned.is_on_workspace(None));
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{ "id": 7, "frame": { "x": 0, "y": 0, "width": 10, "height": 10 }, "monitor": 1 }"#;
        let window: WindowSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(window.id, 7);
        assert!(window.showing_on_its_workspace);
        assert!(!window.minimized);
        assert_eq!(window.window_type, WindowType::Normal);
    }

    #[test]
    fn test_window_type_serializes_kebab_case() {
        let json = serde_json::to_string(&WindowType::ModalDialog).unwrap();
        assert_eq!(json, "\"modal-dialog\"");
    }
}
