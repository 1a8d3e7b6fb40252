//! Overlap tracking between the dock's reserved region and the windows the
//! user is working in.
//!
//! The tracker answers one question for one monitor: does the relevant window
//! collide with the target box? "Relevant" means the first window of the
//! focused application that is on this monitor, visible on its workspace, not
//! minimized and of a handled type. When no such window exists the tracker
//! falls back to scanning every qualifying window on the monitor.
//!
//! Status changes are returned to the caller rather than broadcast, so the
//! coordinator can route them before its handler returns.

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, is_engaged};
use super::host::{Displays, SubscriptionId, Windows};
use super::window::{WindowId, WindowSnapshot, WorkspaceId};

/// Result of the last overlap computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapStatus {
    /// No target box has been set yet.
    #[default]
    Unknown,
    NoOverlap,
    Overlapping,
}

impl OverlapStatus {
    #[must_use]
    pub const fn from_engaged(engaged: bool) -> Self {
        if engaged { Self::Overlapping } else { Self::NoOverlap }
    }
}

#[derive(Debug, Clone, Copy)]
struct WatchedWindow {
    window: WindowId,
    subscription: SubscriptionId,
}

/// Per-monitor overlap tracker.
#[derive(Debug)]
pub struct IntellihideTracker {
    monitor: usize,
    target_box: Option<Rect>,
    status: OverlapStatus,
    watched: Option<WatchedWindow>,
    keyboard_visible: bool,
    destroyed: bool,
}

impl IntellihideTracker {
    #[must_use]
    pub const fn new(monitor: usize) -> Self {
        Self {
            monitor,
            target_box: None,
            status: OverlapStatus::Unknown,
            watched: None,
            keyboard_visible: false,
            destroyed: false,
        }
    }

    #[must_use]
    pub const fn monitor(&self) -> usize { self.monitor }

    #[must_use]
    pub const fn status(&self) -> OverlapStatus { self.status }

    #[must_use]
    pub const fn target_box(&self) -> Option<Rect> { self.target_box }

    /// Returns the window whose frame is currently watched.
    #[must_use]
    pub fn watched_window(&self) -> Option<WindowId> { self.watched.map(|w| w.window) }

    #[must_use]
    pub fn owns_subscription(&self, subscription: SubscriptionId) -> bool {
        self.watched.is_some_and(|w| w.subscription == subscription)
    }

    /// Updates the target box and recomputes, always emitting.
    pub fn set_target_box<H>(&mut self, host: &mut H, target: Rect) -> Option<OverlapStatus>
    where
        H: Windows + Displays,
    {
        if self.destroyed {
            return None;
        }
        self.target_box = Some(target);
        self.check_overlap(host, true)
    }

    /// Recomputes after a window, focus, stacking or workspace change.
    pub fn on_windows_changed<H>(&mut self, host: &mut H) -> Option<OverlapStatus>
    where
        H: Windows + Displays,
    {
        if self.destroyed {
            return None;
        }
        self.check_overlap(host, false)
    }

    /// Re-tests the watched window after its frame changed.
    ///
    /// Only the engagement test runs again; the relevant window is not
    /// re-selected unless it stopped qualifying.
    pub fn on_frame_changed<H>(
        &mut self,
        host: &mut H,
        subscription: SubscriptionId,
    ) -> Option<OverlapStatus>
    where
        H: Windows + Displays,
    {
        if self.destroyed || !self.owns_subscription(subscription) {
            return None;
        }
        let (Some(target), Some(watched)) = (self.target_box, self.watched) else {
            return None;
        };

        let filter = WorkspaceFilter::for_monitor(host, self.monitor);
        match host.window(watched.window) {
            Some(window) if window.is_candidate_for(self.monitor) && filter.admits(&window) => {
                let status = OverlapStatus::from_engaged(is_engaged(&window.frame, &target));
                self.apply(status, false)
            }
            _ => self.check_overlap(host, false),
        }
    }

    /// Applies the on-screen keyboard override.
    ///
    /// A visible keyboard reports a forced overlap. When it hides, a forced
    /// `NoOverlap` is reported first and the regular computation follows.
    /// Without a target box the keyboard state is only recorded; the next
    /// [`Self::set_target_box`] applies it.
    pub fn on_keyboard_visibility<H>(
        &mut self,
        host: &mut H,
        visible: bool,
    ) -> smallvec::SmallVec<[OverlapStatus; 2]>
    where
        H: Windows + Displays,
    {
        let mut emitted = smallvec::SmallVec::new();
        if self.destroyed || self.keyboard_visible == visible {
            return emitted;
        }
        self.keyboard_visible = visible;
        if self.target_box.is_none() {
            return emitted;
        }

        if visible {
            self.release_watch(host);
            emitted.extend(self.apply(OverlapStatus::Overlapping, true));
        } else {
            emitted.extend(self.apply(OverlapStatus::NoOverlap, true));
            emitted.extend(self.check_overlap(host, false));
        }
        emitted
    }

    /// Releases the frame subscription. Idempotent; a destroyed tracker
    /// never emits again.
    pub fn destroy(&mut self, host: &mut impl Windows) {
        self.release_watch(host);
        self.target_box = None;
        self.destroyed = true;
    }

    fn release_watch(&mut self, host: &mut impl Windows) {
        if let Some(watched) = self.watched.take() {
            host.unwatch_frame(watched.subscription);
        }
    }

    fn check_overlap<H>(&mut self, host: &mut H, force: bool) -> Option<OverlapStatus>
    where
        H: Windows + Displays,
    {
        self.release_watch(host);

        let target = self.target_box?;

        if self.keyboard_visible {
            return self.apply(OverlapStatus::Overlapping, force);
        }

        let filter = WorkspaceFilter::for_monitor(host, self.monitor);
        let monitor = self.monitor;
        let qualifies = |w: &WindowSnapshot| w.is_candidate_for(monitor) && filter.admits(w);

        let relevant = host
            .focus_app_windows()
            .and_then(|windows| windows.into_iter().find(|w| qualifies(w)));

        if let Some(window) = relevant {
            let subscription = host.watch_frame(window.id);
            self.watched = Some(WatchedWindow { window: window.id, subscription });
            let status = OverlapStatus::from_engaged(is_engaged(&window.frame, &target));
            tracing::trace!(monitor, window = window.id, ?status, "intellihide: focus window");
            return self.apply(status, force);
        }

        let overlapping = host
            .windows_on_monitor(monitor)
            .iter()
            .filter(|w| qualifies(w))
            .any(|w| is_engaged(&w.frame, &target));
        tracing::trace!(monitor, overlapping, "intellihide: fallback scan");
        self.apply(OverlapStatus::from_engaged(overlapping), true)
    }

    fn apply(&mut self, status: OverlapStatus, force: bool) -> Option<OverlapStatus> {
        if !force && status == self.status {
            return None;
        }
        if status != self.status {
            tracing::debug!(monitor = self.monitor, from = ?self.status, to = ?status, "intellihide: status changed");
        }
        self.status = status;
        Some(status)
    }
}

/// Active-workspace restriction, applied on the primary monitor only.
#[derive(Debug, Clone, Copy)]
enum WorkspaceFilter {
    Any,
    Active(Option<WorkspaceId>),
}

impl WorkspaceFilter {
    fn for_monitor<H>(host: &H, monitor: usize) -> Self
    where
        H: Windows + Displays,
    {
        if host.primary_monitor() == Some(monitor) {
            Self::Active(host.active_workspace())
        } else {
            Self::Any
        }
    }

    fn admits(self, window: &WindowSnapshot) -> bool {
        match self {
            Self::Any => true,
            Self::Active(active) => window.is_on_workspace(active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::host::HostEvent;
    use crate::dock::sim::SimShell;
    use crate::dock::window::WindowType;

    const TARGET: Rect = Rect::new(0.0, 900.0, 1920.0, 60.0);

    fn shell() -> SimShell { SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]) }

    fn focused(sim: &mut SimShell, id: WindowId, frame: Rect) {
        sim.add_window(WindowSnapshot::new(id, frame, 0));
        sim.set_focus_app(vec![id]);
    }

    #[test]
    fn test_unknown_without_target_box() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 850.0, 800.0, 700.0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.on_windows_changed(&mut sim), None);
        assert_eq!(tracker.status(), OverlapStatus::Unknown);
        assert_eq!(sim.live_subscriptions(), 0);
    }

    #[test]
    fn test_focused_window_overlapping() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 850.0, 800.0, 700.0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::Overlapping));
        assert_eq!(tracker.watched_window(), Some(1));
        assert_eq!(sim.live_subscriptions(), 1);
        // Unchanged inputs do not re-emit
        assert_eq!(tracker.on_windows_changed(&mut sim), None);
    }

    #[test]
    fn test_focused_window_clear() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 0.0, 800.0, 800.0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));
    }

    #[test]
    fn test_window_touching_target_edge_is_clear() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 0.0, 800.0, 900.0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));
    }

    #[test]
    fn test_fallback_scan_always_emits() {
        let mut sim = shell();
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 0.0, 400.0, 400.0), 0));
        sim.add_window(WindowSnapshot::new(2, Rect::new(500.0, 0.0, 400.0, 400.0), 0));
        sim.add_window(WindowSnapshot::new(3, Rect::new(1000.0, 0.0, 400.0, 400.0), 0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));
        assert_eq!(tracker.on_windows_changed(&mut sim), Some(OverlapStatus::NoOverlap));
        assert_eq!(sim.live_subscriptions(), 0);
    }

    #[test]
    fn test_fallback_ignores_unhandled_and_minimized() {
        let mut sim = shell();
        let mut desktop = WindowSnapshot::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0), 0);
        desktop.window_type = WindowType::Desktop;
        let mut minimized = WindowSnapshot::new(2, Rect::new(0.0, 850.0, 800.0, 700.0), 0);
        minimized.minimized = true;
        sim.add_window(desktop);
        sim.add_window(minimized);
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));

        sim.update_window(2, |w| w.minimized = false);
        assert_eq!(tracker.on_windows_changed(&mut sim), Some(OverlapStatus::Overlapping));
    }

    #[test]
    fn test_focus_app_without_qualifying_window_falls_back() {
        let mut sim = shell();
        let mut tooltip = WindowSnapshot::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        tooltip.window_type = WindowType::Tooltip;
        sim.add_window(tooltip);
        sim.add_window(WindowSnapshot::new(2, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::Overlapping));
        assert_eq!(tracker.watched_window(), None);
    }

    #[test]
    fn test_frame_change_is_edge_triggered() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 0.0, 800.0, 800.0));
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, TARGET);

        let events = sim.set_window_frame(1, Rect::new(0.0, 100.0, 800.0, 850.0));
        let HostEvent::FrameChanged { subscription } = events[0] else {
            panic!("expected frame change");
        };
        assert_eq!(
            tracker.on_frame_changed(&mut sim, subscription),
            Some(OverlapStatus::Overlapping)
        );

        sim.set_window_frame(1, Rect::new(0.0, 120.0, 800.0, 850.0));
        assert_eq!(tracker.on_frame_changed(&mut sim, subscription), None);
    }

    #[test]
    fn test_foreign_subscription_is_ignored() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 850.0, 800.0, 700.0));
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, TARGET);

        assert_eq!(tracker.on_frame_changed(&mut sim, SubscriptionId(999)), None);
    }

    #[test]
    fn test_single_subscription_across_recomputes() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 850.0, 800.0, 700.0));
        sim.add_window(WindowSnapshot::new(2, Rect::new(0.0, 0.0, 100.0, 100.0), 0));
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, TARGET);

        sim.set_focus_app(vec![2]);
        assert_eq!(tracker.on_windows_changed(&mut sim), Some(OverlapStatus::NoOverlap));
        assert_eq!(sim.watched_windows(), vec![2]);
    }

    #[test]
    fn test_primary_monitor_requires_active_workspace() {
        let mut sim = shell();
        let mut other = WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0);
        other.workspace = Some(1);
        sim.add_window(other);
        sim.set_focus_app(vec![1]);
        sim.set_active_workspace(Some(0));
        let mut tracker = IntellihideTracker::new(0);

        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));

        sim.set_active_workspace(Some(1));
        assert_eq!(tracker.on_windows_changed(&mut sim), Some(OverlapStatus::Overlapping));
    }

    #[test]
    fn test_secondary_monitor_ignores_workspace() {
        let mut sim = SimShell::new(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 1080.0),
        ]);
        let mut other = WindowSnapshot::new(1, Rect::new(1920.0, 850.0, 800.0, 700.0), 1);
        other.workspace = Some(5);
        sim.add_window(other);
        sim.set_focus_app(vec![1]);
        let mut tracker = IntellihideTracker::new(1);

        let target = Rect::new(1920.0, 900.0, 1920.0, 60.0);
        assert_eq!(tracker.set_target_box(&mut sim, target), Some(OverlapStatus::Overlapping));
    }

    #[test]
    fn test_keyboard_override() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 0.0, 800.0, 800.0));
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, TARGET);

        let shown = tracker.on_keyboard_visibility(&mut sim, true);
        assert_eq!(shown.as_slice(), &[OverlapStatus::Overlapping]);
        assert_eq!(sim.live_subscriptions(), 0);
        assert_eq!(tracker.on_windows_changed(&mut sim), None);

        let hidden = tracker.on_keyboard_visibility(&mut sim, false);
        assert_eq!(hidden.as_slice(), &[OverlapStatus::NoOverlap]);
        assert_eq!(sim.live_subscriptions(), 1);
    }

    #[test]
    fn test_keyboard_without_target_box_stays_unknown() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 0.0, 800.0, 800.0));
        let mut tracker = IntellihideTracker::new(0);

        assert!(tracker.on_keyboard_visibility(&mut sim, true).is_empty());
        assert_eq!(tracker.status(), OverlapStatus::Unknown);

        // The recorded keyboard state applies once the box arrives.
        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::Overlapping));

        let hidden = tracker.on_keyboard_visibility(&mut sim, false);
        assert_eq!(hidden.as_slice(), &[OverlapStatus::NoOverlap]);
    }

    #[test]
    fn test_frame_change_rechecks_active_workspace() {
        let mut sim = shell();
        sim.set_active_workspace(Some(0));
        let mut window = WindowSnapshot::new(1, Rect::new(0.0, 0.0, 800.0, 800.0), 0);
        window.workspace = Some(0);
        sim.add_window(window);
        sim.set_focus_app(vec![1]);
        let mut tracker = IntellihideTracker::new(0);
        assert_eq!(tracker.set_target_box(&mut sim, TARGET), Some(OverlapStatus::NoOverlap));

        let events = sim.update_window(1, |w| {
            w.workspace = Some(1);
            w.frame = Rect::new(0.0, 850.0, 800.0, 700.0);
        });
        let HostEvent::FrameChanged { subscription } = events[0] else {
            panic!("expected frame change");
        };

        // Off the active workspace the window no longer counts; the fallback
        // scan finds nothing and re-emits.
        assert_eq!(
            tracker.on_frame_changed(&mut sim, subscription),
            Some(OverlapStatus::NoOverlap)
        );
        assert_eq!(sim.live_subscriptions(), 0);
    }

    #[test]
    fn test_destroy_is_idempotent_and_silent() {
        let mut sim = shell();
        focused(&mut sim, 1, Rect::new(0.0, 850.0, 800.0, 700.0));
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, TARGET);

        tracker.destroy(&mut sim);
        tracker.destroy(&mut sim);
        assert_eq!(sim.live_subscriptions(), 0);
        assert_eq!(tracker.set_target_box(&mut sim, TARGET), None);
        assert_eq!(tracker.on_windows_changed(&mut sim), None);
    }
}
