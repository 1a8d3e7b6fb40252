//! Deterministic in-memory host.
//!
//! `SimShell` implements every collaborator trait on top of plain data and a
//! virtual clock. Timers and animations are queued with deadlines and only
//! fire when the clock is advanced, which makes it suitable for tests and for
//! replaying recorded scenarios from the CLI.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::animation::{DockProps, DockTransition};
use super::geometry::Rect;
use super::host::{
    AnimationId, Animator, BarrierId, BarrierSpec, Barriers, Displays, HostEvent, MainLoop,
    SourceId, SubscriptionId, Windows,
};
use super::manager::DockManager;
use super::window::{WindowId, WindowSnapshot, WorkspaceId};

/// Upper bound on events delivered by a single `advance` call.
const MAX_EVENTS_PER_ADVANCE: usize = 10_000;

/// Rendered state of one dock actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub visible: bool,
    pub props: DockProps,
    pub frame: Rect,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            visible: false,
            props: DockProps::hidden(0.0, 1.0),
            frame: Rect::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingAnimation {
    monitor: usize,
    started: Duration,
    transition: DockTransition,
}

impl PendingAnimation {
    fn deadline(&self) -> Duration { self.started + self.transition.total_duration() }
}

/// In-memory host with a virtual clock.
#[derive(Debug, Default)]
pub struct SimShell {
    now: Duration,
    next_handle: u64,

    monitors: Vec<Rect>,
    work_areas: BTreeMap<usize, Option<Rect>>,
    primary: Option<usize>,
    overview_visible: bool,
    preferred_height: f64,

    windows: Vec<WindowSnapshot>,
    focus_app: Option<Vec<WindowId>>,
    active_workspace: Option<WorkspaceId>,

    subscriptions: BTreeMap<SubscriptionId, WindowId>,
    barriers: BTreeMap<BarrierId, BarrierSpec>,
    timers: BTreeMap<SourceId, Duration>,
    animations: BTreeMap<AnimationId, PendingAnimation>,
    actors: BTreeMap<usize, ActorState>,
}

impl SimShell {
    /// Creates a host with the given monitors. Monitor 0 is primary and every
    /// work area equals its monitor.
    #[must_use]
    pub fn new(monitors: Vec<Rect>) -> Self {
        Self {
            primary: (!monitors.is_empty()).then_some(0),
            monitors,
            preferred_height: 64.0,
            active_workspace: Some(0),
            ..Default::default()
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    // ========================================================================
    // Scene setup
    // ========================================================================

    #[must_use]
    pub fn with_preferred_height(mut self, height: f64) -> Self {
        self.preferred_height = height;
        self
    }

    #[must_use]
    pub fn with_primary(mut self, primary: Option<usize>) -> Self {
        self.primary = primary;
        self
    }

    /// Replaces the monitor set. Work-area overrides are dropped.
    pub fn set_monitors(&mut self, monitors: Vec<Rect>) {
        self.work_areas.clear();
        if self.primary.is_some_and(|p| p >= monitors.len()) {
            self.primary = (!monitors.is_empty()).then_some(0);
        }
        self.monitors = monitors;
    }

    /// Overrides the work area of `monitor`; `None` makes it unavailable.
    pub fn set_work_area(&mut self, monitor: usize, area: Option<Rect>) {
        self.work_areas.insert(monitor, area);
    }

    pub fn set_overview_visible(&mut self, visible: bool) { self.overview_visible = visible; }

    pub fn set_preferred_height(&mut self, height: f64) { self.preferred_height = height; }

    pub fn set_active_workspace(&mut self, workspace: Option<WorkspaceId>) {
        self.active_workspace = workspace;
    }

    /// Adds a window on top of the stack, replacing one with the same id.
    pub fn add_window(&mut self, window: WindowSnapshot) {
        self.windows.retain(|w| w.id != window.id);
        self.windows.push(window);
    }

    pub fn remove_window(&mut self, id: WindowId) {
        self.windows.retain(|w| w.id != id);
        if let Some(app) = self.focus_app.as_mut() {
            app.retain(|w| *w != id);
        }
    }

    /// Makes `windows` the focused application, in preference order.
    pub fn set_focus_app(&mut self, windows: Vec<WindowId>) { self.focus_app = Some(windows); }

    pub fn clear_focus_app(&mut self) { self.focus_app = None; }

    /// Applies `update` to a window and returns the frame-change events of
    /// every subscription watching it.
    pub fn update_window(
        &mut self,
        id: WindowId,
        update: impl FnOnce(&mut WindowSnapshot),
    ) -> Vec<HostEvent> {
        let Some(window) = self.windows.iter_mut().find(|w| w.id == id) else {
            return Vec::new();
        };
        update(window);
        self.subscriptions
            .iter()
            .filter(|(_, watched)| **watched == id)
            .map(|(subscription, _)| HostEvent::FrameChanged { subscription: *subscription })
            .collect()
    }

    /// Moves or resizes a window; see [`Self::update_window`].
    pub fn set_window_frame(&mut self, id: WindowId, frame: Rect) -> Vec<HostEvent> {
        self.update_window(id, |w| w.frame = frame)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[must_use]
    pub const fn now(&self) -> Duration { self.now }

    /// Current virtual time in milliseconds, for barrier hit timestamps.
    #[must_use]
    pub fn now_ms(&self) -> u64 { u64::try_from(self.now.as_millis()).unwrap_or(u64::MAX) }

    #[must_use]
    pub fn live_subscriptions(&self) -> usize { self.subscriptions.len() }

    #[must_use]
    pub fn watched_windows(&self) -> Vec<WindowId> { self.subscriptions.values().copied().collect() }

    #[must_use]
    pub fn barriers(&self) -> Vec<(BarrierId, BarrierSpec)> {
        self.barriers.iter().map(|(id, spec)| (*id, *spec)).collect()
    }

    #[must_use]
    pub fn pending_sources(&self) -> usize { self.timers.len() }

    #[must_use]
    pub fn pending_animations(&self) -> usize { self.animations.len() }

    #[must_use]
    pub fn actor(&self, monitor: usize) -> Option<&ActorState> { self.actors.get(&monitor) }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Pops the earliest timer or animation due at or before `until`, moving
    /// the clock to its deadline.
    pub fn next_due(&mut self, until: Duration) -> Option<HostEvent> {
        let timer = self.timers.iter().map(|(id, deadline)| (*deadline, id.0)).min();
        let animation =
            self.animations.iter().map(|(id, pending)| (pending.deadline(), id.0)).min();

        let (deadline, handle) = match (timer, animation) {
            (Some(t), Some(a)) => t.min(a),
            (Some(t), None) => t,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        if deadline > until {
            return None;
        }
        self.now = self.now.max(deadline);

        if self.timers.remove(&SourceId(handle)).is_some() {
            return Some(HostEvent::SourceFired { source: SourceId(handle) });
        }

        let id = AnimationId(handle);
        let pending = self.animations.remove(&id)?;
        let actor = self.actors.entry(pending.monitor).or_default();
        actor.props = pending.transition.to;
        Some(HostEvent::AnimationCompleted { animation: id })
    }

    /// Advances the clock by `by`, delivering every due timer and animation
    /// completion into `manager` in deadline order.
    pub fn advance(&mut self, manager: &mut DockManager, by: Duration) {
        let until = self.now + by;
        for _ in 0..MAX_EVENTS_PER_ADVANCE {
            let Some(event) = self.next_due(until) else {
                break;
            };
            manager.handle_event(self, event);
        }
        self.advance_to(until);
    }

    /// Moves the clock forward to `time` without delivering anything.
    pub fn advance_to(&mut self, time: Duration) { self.now = self.now.max(time); }

    /// Delivers host events into `manager`.
    pub fn deliver(&mut self, manager: &mut DockManager, events: impl IntoIterator<Item = HostEvent>) {
        for event in events {
            manager.handle_event(self, event);
        }
    }
}

// ============================================================================
// Collaborator Implementations
// ============================================================================

impl Windows for SimShell {
    fn windows_on_monitor(&self, monitor: usize) -> Vec<WindowSnapshot> {
        self.windows.iter().filter(|w| w.monitor == monitor).cloned().collect()
    }

    fn focus_app_windows(&self) -> Option<Vec<WindowSnapshot>> {
        let ids = self.focus_app.as_ref()?;
        Some(ids.iter().filter_map(|id| self.window(*id)).collect())
    }

    fn window(&self, id: WindowId) -> Option<WindowSnapshot> {
        self.windows.iter().find(|w| w.id == id).cloned()
    }

    fn active_workspace(&self) -> Option<WorkspaceId> { self.active_workspace }

    fn watch_frame(&mut self, window: WindowId) -> SubscriptionId {
        let id = SubscriptionId(self.next_id());
        self.subscriptions.insert(id, window);
        id
    }

    fn unwatch_frame(&mut self, subscription: SubscriptionId) {
        self.subscriptions.remove(&subscription);
    }
}

impl Displays for SimShell {
    fn monitors(&self) -> Vec<Rect> { self.monitors.clone() }

    fn primary_monitor(&self) -> Option<usize> { self.primary }

    fn work_area(&self, monitor: usize) -> Option<Rect> {
        match self.work_areas.get(&monitor) {
            Some(area) => *area,
            None => self.monitors.get(monitor).copied(),
        }
    }

    fn overview_visible(&self) -> bool { self.overview_visible }

    fn preferred_dock_height(&self, _monitor: usize, _width: f64) -> f64 { self.preferred_height }
}

impl Barriers for SimShell {
    fn create_barrier(&mut self, spec: BarrierSpec) -> BarrierId {
        let id = BarrierId(self.next_id());
        self.barriers.insert(id, spec);
        id
    }

    fn destroy_barrier(&mut self, barrier: BarrierId) { self.barriers.remove(&barrier); }
}

impl Animator for SimShell {
    fn ease(&mut self, monitor: usize, transition: &DockTransition) -> AnimationId {
        let id = AnimationId(self.next_id());
        self.actors.entry(monitor).or_default().props = transition.from;
        self.animations.insert(id, PendingAnimation {
            monitor,
            started: self.now,
            transition: *transition,
        });
        id
    }

    fn cancel_animation(&mut self, animation: AnimationId) -> Option<DockProps> {
        let pending = self.animations.remove(&animation)?;
        let reached = pending.transition.sample(self.now.saturating_sub(pending.started));
        self.actors.entry(pending.monitor).or_default().props = reached;
        Some(reached)
    }

    fn set_props(&mut self, monitor: usize, props: DockProps) {
        self.actors.entry(monitor).or_default().props = props;
    }

    fn set_visible(&mut self, monitor: usize, visible: bool) {
        self.actors.entry(monitor).or_default().visible = visible;
    }

    fn set_frame(&mut self, monitor: usize, frame: Rect) {
        self.actors.entry(monitor).or_default().frame = frame;
    }
}

impl MainLoop for SimShell {
    fn timeout_add(&mut self, delay: Duration) -> SourceId {
        let id = SourceId(self.next_id());
        self.timers.insert(id, self.now + delay);
        id
    }

    fn idle_add(&mut self) -> SourceId {
        let id = SourceId(self.next_id());
        self.timers.insert(id, self.now);
        id
    }

    fn source_remove(&mut self, source: SourceId) { self.timers.remove(&source); }
}
