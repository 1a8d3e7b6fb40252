//! Host collaborator interfaces.
//!
//! The dock engine does not talk to a compositor directly. Everything it
//! needs from the outside world is expressed through the traits in this
//! module, and everything the outside world tells it arrives as a
//! [`HostEvent`]. A host integration implements [`Shell`] and forwards its
//! notifications into [`DockManager::handle_event`](super::DockManager::handle_event).
//!
//! ```text
//!   window manager ──┐                       ┌── Windows / Displays queries
//!   display server ──┼── HostEvent ──► DockManager ──┼── Barriers
//!   animator/loop  ──┘                       └── Animator / MainLoop
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::animation::{DockProps, DockTransition};
use super::geometry::Rect;
use super::window::{GrabOp, WindowId, WindowSnapshot, WorkspaceId};

// ============================================================================
// Handles
// ============================================================================

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle_type!(
    /// A scheduled main-loop source (timeout or idle callback).
    SourceId
);
handle_type!(
    /// A per-window frame-geometry subscription.
    SubscriptionId
);
handle_type!(
    /// An installed pointer barrier.
    BarrierId
);
handle_type!(
    /// An in-flight animation.
    AnimationId
);

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Window-management queries and subscriptions.
pub trait Windows {
    /// All windows assigned to `monitor`, in stacking order.
    fn windows_on_monitor(&self, monitor: usize) -> Vec<WindowSnapshot>;

    /// Windows of the focused application, or `None` when no application
    /// holds focus (for example right after unlocking the screen).
    fn focus_app_windows(&self) -> Option<Vec<WindowSnapshot>>;

    /// Fresh snapshot of a single window, if it still exists.
    fn window(&self, id: WindowId) -> Option<WindowSnapshot>;

    /// The active workspace.
    fn active_workspace(&self) -> Option<WorkspaceId>;

    /// Subscribes to frame-geometry changes of `window`.
    fn watch_frame(&mut self, window: WindowId) -> SubscriptionId;

    /// Releases a frame-geometry subscription.
    fn unwatch_frame(&mut self, subscription: SubscriptionId);
}

/// Display topology and layout queries.
pub trait Displays {
    /// Monitor rectangles in index order.
    fn monitors(&self) -> Vec<Rect>;

    /// Index of the primary monitor.
    fn primary_monitor(&self) -> Option<usize>;

    /// Work area of `monitor`; `None` while the topology is in transition.
    fn work_area(&self, monitor: usize) -> Option<Rect>;

    /// Whether the overview (app grid / activities) is visible.
    fn overview_visible(&self) -> bool;

    /// Natural height of the dock content when laid out at `width`.
    fn preferred_dock_height(&self, monitor: usize, width: f64) -> f64;
}

/// A horizontal pointer barrier from `x1` to `x2` at `y`.
///
/// The barrier blocks motion in the positive-y direction (downward, off the
/// bottom edge) and lets the pointer move up through it freely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierSpec {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

impl BarrierSpec {
    /// Length of the guarded segment.
    #[must_use]
    pub fn length(&self) -> f64 { (self.x2 - self.x1).abs() }
}

/// Pointer barrier management.
pub trait Barriers {
    /// Installs a barrier that blocks downward pointer motion across
    /// `spec`. Hits and leaves arrive as [`HostEvent::BarrierHit`] and
    /// [`HostEvent::BarrierLeft`] carrying the returned id.
    fn create_barrier(&mut self, spec: BarrierSpec) -> BarrierId;
    fn destroy_barrier(&mut self, barrier: BarrierId);
}

/// Visual property animation for dock actors.
pub trait Animator {
    /// Starts easing the dock on `monitor`; completion arrives as
    /// [`HostEvent::AnimationCompleted`].
    fn ease(&mut self, monitor: usize, transition: &DockTransition) -> AnimationId;

    /// Stops an in-flight animation and returns the properties it reached.
    fn cancel_animation(&mut self, animation: AnimationId) -> Option<DockProps>;

    /// Applies properties immediately, without animation.
    fn set_props(&mut self, monitor: usize, props: DockProps);

    /// Maps or unmaps the dock actor.
    fn set_visible(&mut self, monitor: usize, visible: bool);

    /// Sets the dock actor's frame (size and position).
    fn set_frame(&mut self, monitor: usize, frame: Rect);
}

/// Main-loop scheduling.
///
/// Sources fire on a later loop turn as [`HostEvent::SourceFired`]. A removed
/// source never fires.
pub trait MainLoop {
    fn timeout_add(&mut self, delay: Duration) -> SourceId;
    fn idle_add(&mut self) -> SourceId;
    fn source_remove(&mut self, source: SourceId);
}

/// Everything the dock engine needs from its host.
pub trait Shell: Windows + Displays + Barriers + Animator + MainLoop {}

impl<T> Shell for T where T: Windows + Displays + Barriers + Animator + MainLoop {}

// ============================================================================
// Source Slot
// ============================================================================

/// A single scheduled source for one purpose.
///
/// Scheduling always removes the previous source first, so there is never
/// more than one live source per slot.
#[derive(Debug, Default)]
pub struct SourceSlot {
    id: Option<SourceId>,
}

impl SourceSlot {
    #[must_use]
    pub const fn new() -> Self { Self { id: None } }

    /// Replaces the pending source with a timeout.
    pub fn schedule_timeout(&mut self, host: &mut impl MainLoop, delay: Duration) -> SourceId {
        self.cancel(host);
        let id = host.timeout_add(delay);
        self.id = Some(id);
        id
    }

    /// Replaces the pending source with an idle callback.
    pub fn schedule_idle(&mut self, host: &mut impl MainLoop) -> SourceId {
        self.cancel(host);
        let id = host.idle_add();
        self.id = Some(id);
        id
    }

    /// Removes the pending source, if any.
    pub fn cancel(&mut self, host: &mut impl MainLoop) {
        if let Some(id) = self.id.take() {
            host.source_remove(id);
        }
    }

    /// Consumes the slot if `fired` is its pending source.
    ///
    /// Returns `false` for stale or foreign sources.
    pub fn take_fired(&mut self, fired: SourceId) -> bool {
        if self.id == Some(fired) {
            self.id = None;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool { self.id.is_some() }

    #[must_use]
    pub const fn id(&self) -> Option<SourceId> { self.id }
}

// ============================================================================
// Host Events
// ============================================================================

/// A single barrier hit reported by the pointer barrier backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierHit {
    /// Event timestamp in milliseconds.
    pub time_ms: u64,
    /// Distance the pointer tried to travel across the barrier.
    pub across: f64,
    /// Distance the pointer slid along the barrier.
    #[serde(default)]
    pub along: f64,
}

/// Notifications delivered by the host into the dock engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    /// Monitor set or arrangement changed.
    MonitorsChanged,
    /// One or more work areas changed.
    WorkAreasChanged,
    /// A window was assigned to a monitor.
    WindowEnteredMonitor { window: WindowId, monitor: usize },
    /// A window left a monitor.
    WindowLeftMonitor { window: WindowId, monitor: usize },
    /// Stacking order changed.
    Restacked,
    /// Focused window or focused application changed.
    FocusChanged,
    /// The active workspace changed.
    ActiveWorkspaceChanged,
    /// A watched window's frame changed.
    FrameChanged { subscription: SubscriptionId },
    /// The on-screen keyboard was shown or hidden.
    KeyboardVisibilityChanged { visible: bool },
    /// A pointer grab started.
    GrabBegin { op: GrabOp },
    /// A pointer grab ended.
    GrabEnd { op: GrabOp },
    /// The pointer pushed against a barrier.
    BarrierHit { barrier: BarrierId, hit: BarrierHit },
    /// The pointer moved away from a barrier.
    BarrierLeft { barrier: BarrierId },
    /// Pointer hover over a dock changed.
    HoverChanged { monitor: usize, hovered: bool },
    /// An item menu on a dock opened or closed.
    MenuStateChanged { monitor: usize, open: bool },
    /// A dock item drag started.
    ItemDragBegin,
    /// A dock item drag ended.
    ItemDragEnd,
    /// The overview finished showing.
    OverviewShown,
    /// The overview started hiding.
    OverviewHiding,
    /// The overview finished hiding.
    OverviewHidden,
    /// Dock content (icon size, item count) finished resizing.
    ContentResized { monitor: usize },
    /// A scheduled main-loop source fired.
    SourceFired { source: SourceId },
    /// An animation ran to completion.
    AnimationCompleted { animation: AnimationId },
}

impl HostEvent {
    /// Returns the event name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MonitorsChanged => "monitors-changed",
            Self::WorkAreasChanged => "workareas-changed",
            Self::WindowEnteredMonitor { .. } => "window-entered-monitor",
            Self::WindowLeftMonitor { .. } => "window-left-monitor",
            Self::Restacked => "restacked",
            Self::FocusChanged => "focus-changed",
            Self::ActiveWorkspaceChanged => "active-workspace-changed",
            Self::FrameChanged { .. } => "frame-changed",
            Self::KeyboardVisibilityChanged { .. } => "keyboard-visibility-changed",
            Self::GrabBegin { .. } => "grab-op-begin",
            Self::GrabEnd { .. } => "grab-op-end",
            Self::BarrierHit { .. } => "barrier-hit",
            Self::BarrierLeft { .. } => "barrier-left",
            Self::HoverChanged { .. } => "hover-changed",
            Self::MenuStateChanged { .. } => "menu-state-changed",
            Self::ItemDragBegin => "item-drag-begin",
            Self::ItemDragEnd => "item-drag-end",
            Self::OverviewShown => "overview-shown",
            Self::OverviewHiding => "overview-hiding",
            Self::OverviewHidden => "overview-hidden",
            Self::ContentResized { .. } => "content-resized",
            Self::SourceFired { .. } => "source-fired",
            Self::AnimationCompleted { .. } => "animation-completed",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
