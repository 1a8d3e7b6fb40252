//! Auto-revealing bottom-edge dock engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Host (Shell)                           │
//! │  windows, displays, pointer barriers, animator, main loop   │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ HostEvent
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DockManager                             │
//! │  - One triple per eligible monitor                          │
//! │  - Routes events, rebuilds on topology change               │
//! └──────┬──────────────────┬───────────────────┬───────────────┘
//!        │                  │                   │
//!        ▼                  ▼                   ▼
//! ┌────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │  HotEdge   │   │IntellihideTracker│   │  DockVisibility    │
//! │  pressure  │   │  overlap status  │   │  show/hide/autohide│
//! └─────┬──────┘   └────────┬─────────┘   └─────────▲──────────┘
//!       │ triggered         │ status                │
//!       └───────────────────┴───────────────────────┘
//!             reveal()          block_autohide()
//! ```
//!
//! The engine is single-threaded and never blocks. Deferred work goes
//! through the host's main loop and comes back as `HostEvent::SourceFired`.

pub mod animation;
pub mod geometry;
pub mod host;
pub mod hot_edge;
pub mod intellihide;
pub mod manager;
pub mod sim;
pub mod visibility;
pub mod window;

pub use animation::{DockProps, DockTransition, TransitionTiming};
pub use geometry::{Rect, eligible_monitors, is_engaged};
pub use host::{
    AnimationId, Animator, BarrierHit, BarrierId, BarrierSpec, Barriers, Displays, HostEvent,
    MainLoop, Shell, SourceId, SubscriptionId, Windows,
};
pub use hot_edge::{HotEdge, PressureBarrier};
pub use intellihide::{IntellihideTracker, OverlapStatus};
pub use manager::{DockEntry, DockManager, DockSignal};
pub use sim::SimShell;
pub use visibility::{DockVisibility, PanelVisualState, SuppressionFlags, VisibilitySettings};
pub use window::{GrabOp, WindowId, WindowSnapshot, WindowType, WorkspaceId};
