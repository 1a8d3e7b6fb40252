//! Multi-monitor dock coordination.
//!
//! The manager decides which monitors get a dock, owns one
//! {hot edge, overlap tracker, visibility controller} triple per eligible
//! monitor, and routes every [`HostEvent`] to the components that care about
//! it. Signals produced while handling an event are routed to their consumers
//! before `handle_event` returns and are also recorded for observers.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::geometry::{Rect, eligible_monitors};
use super::host::{HostEvent, Shell};
use super::hot_edge::HotEdge;
use super::intellihide::{IntellihideTracker, OverlapStatus};
use super::visibility::{DockVisibility, PanelVisualState, VisibilitySettings};
use crate::config::LedgeConfig;

// ============================================================================
// Signals
// ============================================================================

/// Observable outputs of the dock engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum DockSignal {
    /// The dock area of a monitor was recomputed.
    TargetBoxUpdated { monitor: usize, target_box: Rect },
    /// The overlap tracker reported a status.
    StatusChanged { monitor: usize, status: OverlapStatus },
    /// Edge pressure requested a reveal.
    Triggered { monitor: usize },
    /// The visual state of a dock changed.
    VisibilityChanged { monitor: usize, state: PanelVisualState },
}

impl DockSignal {
    #[must_use]
    pub const fn monitor(&self) -> usize {
        match self {
            Self::TargetBoxUpdated { monitor, .. }
            | Self::StatusChanged { monitor, .. }
            | Self::Triggered { monitor }
            | Self::VisibilityChanged { monitor, .. } => *monitor,
        }
    }
}

// ============================================================================
// Dock Entry
// ============================================================================

/// Components serving one eligible monitor.
#[derive(Debug)]
pub struct DockEntry {
    monitor: usize,
    hot_edge: HotEdge,
    tracker: IntellihideTracker,
    visibility: DockVisibility,
}

impl DockEntry {
    #[must_use]
    pub const fn monitor(&self) -> usize { self.monitor }

    #[must_use]
    pub const fn hot_edge(&self) -> &HotEdge { &self.hot_edge }

    #[must_use]
    pub const fn tracker(&self) -> &IntellihideTracker { &self.tracker }

    #[must_use]
    pub const fn visibility(&self) -> &DockVisibility { &self.visibility }

    pub fn visibility_mut(&mut self) -> &mut DockVisibility { &mut self.visibility }

    fn apply_target_box(&mut self, host: &mut impl Shell, target_box: Rect, signals: &mut Vec<DockSignal>) {
        signals.push(DockSignal::TargetBoxUpdated { monitor: self.monitor, target_box });
        if let Some(status) = self.tracker.set_target_box(host, target_box) {
            self.apply_status(host, status, signals);
        }
    }

    /// Overlap drives autohide blocking: with nothing in the way the dock
    /// stays up, an overlapping window lets it hide.
    fn apply_status(&mut self, host: &mut impl Shell, status: OverlapStatus, signals: &mut Vec<DockSignal>) {
        signals.push(DockSignal::StatusChanged { monitor: self.monitor, status });
        match status {
            OverlapStatus::NoOverlap => self.visibility.block_autohide(host, true),
            OverlapStatus::Overlapping => self.visibility.block_autohide(host, false),
            OverlapStatus::Unknown => {}
        }
    }

    fn destroy(&mut self, host: &mut impl Shell) {
        self.hot_edge.destroy(host);
        self.tracker.destroy(host);
        self.visibility.destroy(host);
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Owns every dock and routes host events between them.
#[derive(Debug)]
pub struct DockManager {
    config: LedgeConfig,
    docks: Vec<DockEntry>,
    signals: Vec<DockSignal>,
    destroyed: bool,
}

impl DockManager {
    /// Creates the manager and builds docks for the current topology.
    pub fn new(host: &mut impl Shell, config: LedgeConfig) -> Self {
        let mut manager = Self {
            config,
            docks: Vec::new(),
            signals: Vec::new(),
            destroyed: false,
        };
        manager.observe(host, |manager, host| manager.rebuild(host));
        manager
    }

    #[must_use]
    pub const fn config(&self) -> &LedgeConfig { &self.config }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool { self.destroyed }

    /// Monitors that currently have a dock.
    #[must_use]
    pub fn monitors(&self) -> Vec<usize> { self.docks.iter().map(DockEntry::monitor).collect() }

    #[must_use]
    pub fn docks(&self) -> &[DockEntry] { &self.docks }

    #[must_use]
    pub fn dock(&self, monitor: usize) -> Option<&DockEntry> {
        self.docks.iter().find(|d| d.monitor == monitor)
    }

    pub fn dock_mut(&mut self, monitor: usize) -> Option<&mut DockEntry> {
        self.docks.iter_mut().find(|d| d.monitor == monitor)
    }

    /// Returns and clears the signals recorded since the last call.
    pub fn drain_signals(&mut self) -> Vec<DockSignal> { std::mem::take(&mut self.signals) }

    // ========================================================================
    // Direct control
    // ========================================================================

    /// Shows the dock on `monitor`.
    pub fn show(&mut self, host: &mut impl Shell, monitor: usize, animate: bool) {
        self.with_dock(host, monitor, |dock, host| dock.visibility.show(host, animate));
    }

    /// Hides the dock on `monitor`.
    pub fn hide(&mut self, host: &mut impl Shell, monitor: usize, animate: bool) {
        self.with_dock(host, monitor, |dock, host| dock.visibility.hide(host, animate));
    }

    /// Blocks or unblocks autohide of the dock on `monitor`.
    pub fn block_autohide(&mut self, host: &mut impl Shell, monitor: usize, block: bool) {
        self.with_dock(host, monitor, |dock, host| dock.visibility.block_autohide(host, block));
    }

    fn with_dock<H: Shell>(
        &mut self,
        host: &mut H,
        monitor: usize,
        action: impl FnOnce(&mut DockEntry, &mut H),
    ) {
        if self.destroyed {
            return;
        }
        self.observe(host, |manager, host| {
            if let Some(dock) = manager.dock_mut(monitor) {
                action(dock, host);
            }
        });
    }

    // ========================================================================
    // Event routing
    // ========================================================================

    /// Single entry point for host notifications.
    pub fn handle_event<H: Shell>(&mut self, host: &mut H, event: HostEvent) {
        if self.destroyed {
            tracing::trace!(event = event.name(), "dock manager: destroyed, ignoring event");
            return;
        }
        tracing::trace!(event = event.name(), "dock manager: handling event");
        self.observe(host, |manager, host| manager.dispatch(host, event));
    }

    /// Runs `f` and records a visibility signal for every dock whose visual
    /// state differs afterwards.
    fn observe<H: Shell>(&mut self, host: &mut H, f: impl FnOnce(&mut Self, &mut H)) {
        let before: SmallVec<[(usize, PanelVisualState); 4]> =
            self.docks.iter().map(|d| (d.monitor, d.visibility.state())).collect();

        f(self, host);

        for dock in &self.docks {
            let previous = before
                .iter()
                .find(|(monitor, _)| *monitor == dock.monitor)
                .map_or(PanelVisualState::Hidden, |(_, state)| *state);
            let state = dock.visibility.state();
            if state != previous {
                self.signals.push(DockSignal::VisibilityChanged { monitor: dock.monitor, state });
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, host: &mut impl Shell, event: HostEvent) {
        let signals = &mut self.signals;

        match event {
            HostEvent::MonitorsChanged => self.rebuild(host),

            HostEvent::WorkAreasChanged => {
                for dock in &mut self.docks {
                    if let Some(target_box) = dock.visibility.update_dock_area(host, true) {
                        dock.apply_target_box(host, target_box, signals);
                    }
                }
            }

            HostEvent::WindowEnteredMonitor { monitor, .. }
            | HostEvent::WindowLeftMonitor { monitor, .. } => {
                for dock in self.docks.iter_mut().filter(|d| d.monitor == monitor) {
                    if let Some(status) = dock.tracker.on_windows_changed(host) {
                        dock.apply_status(host, status, signals);
                    }
                }
            }

            HostEvent::Restacked | HostEvent::FocusChanged | HostEvent::ActiveWorkspaceChanged => {
                for dock in &mut self.docks {
                    if let Some(status) = dock.tracker.on_windows_changed(host) {
                        dock.apply_status(host, status, signals);
                    }
                }
            }

            HostEvent::FrameChanged { subscription } => {
                for dock in &mut self.docks {
                    if let Some(status) = dock.tracker.on_frame_changed(host, subscription) {
                        dock.apply_status(host, status, signals);
                    }
                }
            }

            HostEvent::KeyboardVisibilityChanged { visible } => {
                for dock in &mut self.docks {
                    for status in dock.tracker.on_keyboard_visibility(host, visible) {
                        dock.apply_status(host, status, signals);
                    }
                }
            }

            HostEvent::GrabBegin { op } => {
                for dock in &mut self.docks {
                    dock.hot_edge.on_grab_begin(op);
                }
            }

            HostEvent::GrabEnd { op } => {
                for dock in &mut self.docks {
                    dock.hot_edge.on_grab_end(op);
                }
            }

            HostEvent::BarrierHit { barrier, hit } => {
                for dock in &mut self.docks {
                    if dock.hot_edge.on_barrier_hit(&*host, barrier, hit) {
                        signals.push(DockSignal::Triggered { monitor: dock.monitor });
                        dock.visibility.reveal(host);
                    }
                }
            }

            HostEvent::BarrierLeft { barrier } => {
                for dock in &mut self.docks {
                    dock.hot_edge.on_barrier_left(barrier);
                }
            }

            HostEvent::HoverChanged { monitor, hovered } => {
                for dock in self.docks.iter_mut().filter(|d| d.monitor == monitor) {
                    dock.visibility.set_hovered(host, hovered);
                }
            }

            HostEvent::MenuStateChanged { monitor, open } => {
                for dock in self.docks.iter_mut().filter(|d| d.monitor == monitor) {
                    dock.visibility.set_menu_open(host, open);
                }
            }

            HostEvent::ItemDragBegin | HostEvent::ItemDragEnd => {
                let dragging = matches!(event, HostEvent::ItemDragBegin);
                for dock in &mut self.docks {
                    dock.visibility.set_dragging_item(host, dragging);
                }
            }

            HostEvent::OverviewShown => {
                for dock in &mut self.docks {
                    dock.visibility.on_overview_shown(host);
                }
            }

            HostEvent::OverviewHiding => {
                for dock in &mut self.docks {
                    dock.visibility.on_overview_hiding(host);
                }
            }

            HostEvent::OverviewHidden => {
                for dock in &mut self.docks {
                    dock.visibility.on_overview_hidden(host);
                }
            }

            HostEvent::ContentResized { monitor } => {
                for dock in self.docks.iter_mut().filter(|d| d.monitor == monitor) {
                    dock.visibility.on_content_resized(host);
                }
            }

            HostEvent::SourceFired { source } => {
                for dock in &mut self.docks {
                    if let Some(target_box) = dock.visibility.on_source_fired(host, source) {
                        dock.apply_target_box(host, target_box, signals);
                    }
                }
            }

            HostEvent::AnimationCompleted { animation } => {
                for dock in &mut self.docks {
                    if dock.visibility.on_animation_completed(host, animation) {
                        break;
                    }
                }
            }
        }
    }

    // ========================================================================
    // Topology
    // ========================================================================

    fn teardown(&mut self, host: &mut impl Shell) {
        for mut dock in self.docks.drain(..) {
            dock.destroy(host);
        }
    }

    /// Tears down every dock and builds new ones for the current topology.
    pub fn rebuild(&mut self, host: &mut impl Shell) {
        self.teardown(host);

        let monitors = host.monitors();
        let primary = host.primary_monitor();
        let eligible = eligible_monitors(&monitors);
        tracing::debug!(monitors = monitors.len(), ?eligible, "dock manager: rebuilding docks");

        let settings = VisibilitySettings::from(&self.config);
        for index in eligible {
            let Some(rect) = monitors.get(index).copied() else {
                continue;
            };

            let mut hot_edge = HotEdge::new(
                index,
                rect,
                self.config.pressure.threshold,
                self.config.pressure_timeout(),
            );
            hot_edge.set_barrier_size(host, rect.width);

            let mut dock = DockEntry {
                monitor: index,
                hot_edge,
                tracker: IntellihideTracker::new(index),
                visibility: DockVisibility::new(index, primary == Some(index), settings),
            };

            if let Some(target_box) = dock.visibility.update_dock_area(host, true) {
                dock.apply_target_box(host, target_box, &mut self.signals);
            }
            self.docks.push(dock);
        }
    }

    /// Releases every resource. Idempotent; a destroyed manager ignores all
    /// further events.
    pub fn destroy(&mut self, host: &mut impl Shell) {
        if self.destroyed {
            return;
        }
        self.teardown(host);
        self.destroyed = true;
        tracing::debug!("dock manager: destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dock::host::BarrierHit;
    use crate::dock::sim::SimShell;
    use crate::dock::window::{GrabOp, WindowSnapshot};

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

    fn single() -> (SimShell, DockManager) {
        let mut sim = SimShell::new(vec![SCREEN]);
        let manager = DockManager::new(&mut sim, LedgeConfig::default());
        (sim, manager)
    }

    fn statuses(signals: &[DockSignal]) -> Vec<OverlapStatus> {
        signals
            .iter()
            .filter_map(|s| match s {
                DockSignal::StatusChanged { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_build_emits_target_box_and_status() {
        let (_sim, mut manager) = single();
        let signals = manager.drain_signals();

        assert_eq!(signals[0], DockSignal::TargetBoxUpdated {
            monitor: 0,
            target_box: Rect::new(0.0, 1016.0, 1920.0, 64.0),
        });
        assert_eq!(statuses(&signals), vec![OverlapStatus::NoOverlap]);
        assert!(signals.contains(&DockSignal::VisibilityChanged {
            monitor: 0,
            state: PanelVisualState::Revealing,
        }));
    }

    #[test]
    fn test_vertical_stack_guards_lower_monitor_only() {
        let mut sim = SimShell::new(vec![SCREEN, Rect::new(0.0, 1080.0, 1920.0, 1080.0)]);
        let manager = DockManager::new(&mut sim, LedgeConfig::default());

        assert_eq!(manager.monitors(), vec![1]);
        let barriers = sim.barriers();
        assert_eq!(barriers.len(), 1);
        assert!((barriers[0].1.y - 2160.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlap_lets_dock_autohide() {
        let (mut sim, mut manager) = single();
        sim.advance(&mut manager, Duration::from_secs(1));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Shown);

        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);
        manager.drain_signals();
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        assert_eq!(statuses(&manager.drain_signals()), vec![OverlapStatus::Overlapping]);

        sim.advance(&mut manager, Duration::from_secs(1));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);
    }

    #[test]
    fn test_pressure_reveals_hidden_dock() {
        let (mut sim, mut manager) = single();
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        sim.advance(&mut manager, Duration::from_secs(1));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);

        let barrier = manager.dock(0).unwrap().hot_edge().barrier().unwrap();
        let hit = BarrierHit { time_ms: sim.now_ms(), across: 200.0, along: 0.0 };
        manager.drain_signals();
        manager.handle_event(&mut sim, HostEvent::BarrierHit { barrier, hit });

        let signals = manager.drain_signals();
        assert!(signals.contains(&DockSignal::Triggered { monitor: 0 }));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Revealing);

        // Unhovered reveal autohides again
        sim.advance(&mut manager, Duration::from_secs(1));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);
    }

    #[test]
    fn test_overview_blocks_edge_reveal() {
        let (mut sim, mut manager) = single();
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        sim.advance(&mut manager, Duration::from_secs(1));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);

        sim.set_overview_visible(true);
        manager.handle_event(&mut sim, HostEvent::OverviewShown);
        manager.drain_signals();

        let barrier = manager.dock(0).unwrap().hot_edge().barrier().unwrap();
        let hit = BarrierHit { time_ms: sim.now_ms(), across: 500.0, along: 0.0 };
        manager.handle_event(&mut sim, HostEvent::BarrierHit { barrier, hit });

        assert!(!manager.drain_signals().contains(&DockSignal::Triggered { monitor: 0 }));
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);
    }

    #[test]
    fn test_move_drag_suppresses_trigger() {
        let (mut sim, mut manager) = single();
        let barrier = manager.dock(0).unwrap().hot_edge().barrier().unwrap();
        manager.handle_event(&mut sim, HostEvent::GrabBegin { op: GrabOp::Moving });
        manager.drain_signals();

        let hit = BarrierHit { time_ms: 0, across: 500.0, along: 0.0 };
        manager.handle_event(&mut sim, HostEvent::BarrierHit { barrier, hit });
        assert!(!manager.drain_signals().contains(&DockSignal::Triggered { monitor: 0 }));

        manager.handle_event(&mut sim, HostEvent::GrabEnd { op: GrabOp::Moving });
        let hit = BarrierHit { time_ms: 100, across: 500.0, along: 0.0 };
        manager.handle_event(&mut sim, HostEvent::BarrierHit { barrier, hit });
        assert!(manager.drain_signals().contains(&DockSignal::Triggered { monitor: 0 }));
    }

    #[test]
    fn test_rebuild_releases_resources() {
        let (mut sim, mut manager) = single();
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 0.0, 800.0, 800.0), 0));
        sim.set_focus_app(vec![1]);
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        manager.handle_event(&mut sim, HostEvent::ContentResized { monitor: 0 });
        assert_eq!(sim.live_subscriptions(), 1);

        sim.set_monitors(vec![SCREEN, Rect::new(1920.0, 0.0, 1920.0, 1080.0)]);
        manager.handle_event(&mut sim, HostEvent::MonitorsChanged);

        assert_eq!(manager.monitors(), vec![0, 1]);
        assert_eq!(sim.barriers().len(), 2);
        assert_eq!(sim.live_subscriptions(), 1);
    }

    #[test]
    fn test_destroy_releases_everything_and_silences() {
        let (mut sim, mut manager) = single();
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 0.0, 800.0, 800.0), 0));
        sim.set_focus_app(vec![1]);
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        manager.handle_event(&mut sim, HostEvent::ContentResized { monitor: 0 });

        manager.destroy(&mut sim);
        manager.destroy(&mut sim);
        assert!(sim.barriers().is_empty());
        assert_eq!(sim.live_subscriptions(), 0);
        assert_eq!(sim.pending_sources(), 0);
        assert_eq!(sim.pending_animations(), 0);

        manager.drain_signals();
        manager.handle_event(&mut sim, HostEvent::MonitorsChanged);
        sim.advance(&mut manager, Duration::from_secs(5));
        assert!(manager.drain_signals().is_empty());
        assert!(manager.monitors().is_empty());
    }

    #[test]
    fn test_work_area_change_updates_target_box() {
        let (mut sim, mut manager) = single();
        manager.drain_signals();
        sim.set_work_area(0, Some(Rect::new(0.0, 0.0, 1920.0, 1040.0)));
        manager.handle_event(&mut sim, HostEvent::WorkAreasChanged);

        let signals = manager.drain_signals();
        assert_eq!(signals[0], DockSignal::TargetBoxUpdated {
            monitor: 0,
            target_box: Rect::new(0.0, 976.0, 1920.0, 64.0),
        });
        assert_eq!(manager.dock(0).unwrap().tracker().target_box(), Some(Rect::new(0.0, 976.0, 1920.0, 64.0)));
    }

    #[test]
    fn test_hover_keeps_overlapped_dock_visible() {
        let (mut sim, mut manager) = single();
        sim.advance(&mut manager, Duration::from_secs(1));
        manager.handle_event(&mut sim, HostEvent::HoverChanged { monitor: 0, hovered: true });

        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);
        manager.handle_event(&mut sim, HostEvent::FocusChanged);
        sim.advance(&mut manager, Duration::from_secs(2));

        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Shown);
    }

    #[test]
    fn test_keyboard_forces_room_for_dock() {
        let (mut sim, mut manager) = single();
        sim.advance(&mut manager, Duration::from_secs(1));
        manager.drain_signals();

        manager.handle_event(&mut sim, HostEvent::KeyboardVisibilityChanged { visible: true });
        assert_eq!(statuses(&manager.drain_signals()), vec![OverlapStatus::Overlapping]);

        manager.handle_event(&mut sim, HostEvent::KeyboardVisibilityChanged { visible: false });
        assert_eq!(statuses(&manager.drain_signals()), vec![OverlapStatus::NoOverlap, OverlapStatus::NoOverlap]);
    }

    #[test]
    fn test_keyboard_before_work_area_stays_unknown() {
        let mut sim = SimShell::new(vec![SCREEN]);
        sim.set_work_area(0, None);
        let mut manager = DockManager::new(&mut sim, LedgeConfig::default());
        manager.drain_signals();

        manager.handle_event(&mut sim, HostEvent::KeyboardVisibilityChanged { visible: true });

        assert!(statuses(&manager.drain_signals()).is_empty());
        let tracker = manager.dock(0).unwrap().tracker();
        assert_eq!(tracker.target_box(), None);
        assert_eq!(tracker.status(), OverlapStatus::Unknown);
    }

    #[test]
    fn test_overview_round_trip() {
        let (mut sim, mut manager) = single();
        sim.advance(&mut manager, Duration::from_secs(1));

        sim.set_overview_visible(true);
        manager.handle_event(&mut sim, HostEvent::OverviewShown);
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Hidden);

        sim.set_overview_visible(false);
        manager.handle_event(&mut sim, HostEvent::OverviewHiding);
        manager.handle_event(&mut sim, HostEvent::OverviewHidden);
        assert_eq!(manager.dock(0).unwrap().visibility().state(), PanelVisualState::Revealing);
    }

    #[test]
    fn test_direct_control_records_visibility() {
        let (mut sim, mut manager) = single();
        sim.advance(&mut manager, Duration::from_secs(1));
        manager.drain_signals();

        manager.hide(&mut sim, 0, false);
        assert_eq!(manager.drain_signals(), vec![DockSignal::VisibilityChanged {
            monitor: 0,
            state: PanelVisualState::Hidden,
        }]);
    }
}
