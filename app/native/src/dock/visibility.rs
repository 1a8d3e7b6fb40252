//! Dock visibility state machine.
//!
//! Arbitrates between reveal requests (edge pressure, overlap changes) and
//! autohide (hover, menus, item drags, external blocks). The controller owns
//! the dock's on-screen geometry and drives show/hide transitions through the
//! host animator; transitions complete asynchronously via
//! [`HostEvent::AnimationCompleted`](super::host::HostEvent::AnimationCompleted).
//!
//! ```text
//!            show(animate)                 completion
//!   Hidden ───────────────► Revealing ───────────────► Shown
//!     ▲                                                  │
//!     │        completion                 hide(animate)  │
//!     └───────────────────── Hiding ◄────────────────────┘
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::animation::{Direction, DockProps, DockTransition, TransitionTiming};
use super::geometry::Rect;
use super::host::{AnimationId, Shell, SourceId, SourceSlot};
use crate::config::LedgeConfig;

// ============================================================================
// State Types
// ============================================================================

/// Visual state of a dock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelVisualState {
    #[default]
    Hidden,
    Revealing,
    Shown,
    Hiding,
}

impl PanelVisualState {
    /// Whether the dock is on screen or on its way there.
    #[must_use]
    pub const fn is_visible(self) -> bool { matches!(self, Self::Revealing | Self::Shown) }
}

/// Conditions that keep the dock from autohiding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionFlags {
    pub hovered: bool,
    pub dragging_item: bool,
    pub menu_open: bool,
    pub externally_blocked: bool,
}

impl SuppressionFlags {
    /// Whether any condition holds.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.hovered || self.dragging_item || self.menu_open || self.externally_blocked
    }
}

/// Tuning values for a visibility controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySettings {
    pub autohide_delay: Duration,
    pub relayout_delay: Duration,
    pub max_height_ratio: f64,
    pub timing: TransitionTiming,
}

impl From<&LedgeConfig> for VisibilitySettings {
    fn from(config: &LedgeConfig) -> Self {
        Self {
            autohide_delay: config.autohide_delay(),
            relayout_delay: config.relayout_delay(),
            max_height_ratio: config.dock.max_height_ratio,
            timing: TransitionTiming {
                duration: config.animation_duration(),
                hide_scale: config.animation.hide_scale,
            },
        }
    }
}

impl Default for VisibilitySettings {
    fn default() -> Self { Self::from(&LedgeConfig::default()) }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: AnimationId,
    transition: DockTransition,
}

// ============================================================================
// Visibility Controller
// ============================================================================

/// Show/hide controller for the dock on one monitor.
#[derive(Debug)]
pub struct DockVisibility {
    monitor: usize,
    is_primary: bool,
    settings: VisibilitySettings,

    state: PanelVisualState,
    flags: SuppressionFlags,
    props: DockProps,
    frame: Option<Rect>,
    animation: Option<InFlight>,

    autohide: SourceSlot,
    recheck: SourceSlot,
    relayout: SourceSlot,

    destroyed: bool,
}

impl DockVisibility {
    /// Creates a hidden dock. Geometry is unknown until
    /// [`Self::update_dock_area`] runs.
    #[must_use]
    pub fn new(monitor: usize, is_primary: bool, settings: VisibilitySettings) -> Self {
        Self {
            monitor,
            is_primary,
            settings,
            state: PanelVisualState::Hidden,
            flags: SuppressionFlags::default(),
            props: DockProps::hidden(0.0, settings.timing.hide_scale),
            frame: None,
            animation: None,
            autohide: SourceSlot::new(),
            recheck: SourceSlot::new(),
            relayout: SourceSlot::new(),
            destroyed: false,
        }
    }

    #[must_use]
    pub const fn monitor(&self) -> usize { self.monitor }

    #[must_use]
    pub const fn state(&self) -> PanelVisualState { self.state }

    #[must_use]
    pub const fn flags(&self) -> SuppressionFlags { self.flags }

    /// The dock's frame at its shown position, i.e. the target box.
    #[must_use]
    pub const fn frame(&self) -> Option<Rect> { self.frame }

    /// Last resting (or transition start) properties.
    #[must_use]
    pub const fn props(&self) -> DockProps { self.props }

    #[must_use]
    pub const fn is_animating(&self) -> bool { self.animation.is_some() }

    #[must_use]
    pub const fn autohide_pending(&self) -> bool { self.autohide.is_pending() }

    /// Vertical positions of the shown and hidden resting places.
    fn band(&self) -> Option<(f64, f64)> { self.frame.map(|f| (f.y, f.bottom())) }

    // ========================================================================
    // Show / Hide
    // ========================================================================

    /// Reveals the dock.
    pub fn show(&mut self, host: &mut impl Shell, animate: bool) {
        if self.destroyed {
            return;
        }
        match self.state {
            PanelVisualState::Shown => return,
            PanelVisualState::Revealing if animate => return,
            _ => {}
        }
        let Some((show_y, hide_y)) = self.band() else {
            tracing::trace!(monitor = self.monitor, "visibility: show without dock area");
            return;
        };

        let mut from = self.cancel_animation(host);
        from.y = from.y.clamp(show_y, hide_y);
        host.set_visible(self.monitor, true);

        if animate && !self.settings.timing.duration.is_zero() {
            let transition = DockTransition::show(from, show_y, self.settings.timing);
            self.start(host, transition, PanelVisualState::Revealing);
        } else {
            self.settle(host, DockProps::shown(show_y), PanelVisualState::Shown);
        }
    }

    /// Hides the dock.
    pub fn hide(&mut self, host: &mut impl Shell, animate: bool) {
        if self.destroyed {
            return;
        }
        match self.state {
            PanelVisualState::Hidden => return,
            PanelVisualState::Hiding if animate => return,
            _ => {}
        }
        let Some((show_y, hide_y)) = self.band() else {
            tracing::trace!(monitor = self.monitor, "visibility: hide without dock area");
            return;
        };

        let mut from = self.cancel_animation(host);
        from.y = from.y.clamp(show_y, hide_y);

        if animate && !self.settings.timing.duration.is_zero() {
            let transition = DockTransition::hide(from, hide_y, self.settings.timing);
            self.start(host, transition, PanelVisualState::Hiding);
        } else {
            self.finish_hide(host, hide_y);
        }
    }

    fn start(&mut self, host: &mut impl Shell, transition: DockTransition, state: PanelVisualState) {
        let id = host.ease(self.monitor, &transition);
        tracing::debug!(monitor = self.monitor, animation = %id, ?state, "visibility: transition started");
        self.props = transition.from;
        self.animation = Some(InFlight { id, transition });
        self.state = state;
    }

    fn settle(&mut self, host: &mut impl Shell, props: DockProps, state: PanelVisualState) {
        host.set_props(self.monitor, props);
        self.props = props;
        if self.state != state {
            tracing::debug!(monitor = self.monitor, ?state, "visibility: settled");
        }
        self.state = state;
    }

    fn finish_hide(&mut self, host: &mut impl Shell, hide_y: f64) {
        self.settle(
            host,
            DockProps::hidden(hide_y, self.settings.timing.hide_scale),
            PanelVisualState::Hidden,
        );
        host.set_visible(self.monitor, false);
    }

    /// Stops the in-flight transition and returns where the dock is now.
    fn cancel_animation(&mut self, host: &mut impl Shell) -> DockProps {
        match self.animation.take() {
            Some(in_flight) => {
                let reached = host.cancel_animation(in_flight.id).unwrap_or(in_flight.transition.to);
                self.props = reached;
                reached
            }
            None => self.props,
        }
    }

    /// Completes the transition identified by `animation`, if it is ours.
    pub fn on_animation_completed(&mut self, host: &mut impl Shell, animation: AnimationId) -> bool {
        let Some(in_flight) = self.animation.filter(|a| a.id == animation) else {
            return false;
        };
        self.animation = None;

        match in_flight.transition.direction {
            Direction::Show => self.settle(host, in_flight.transition.to, PanelVisualState::Shown),
            Direction::Hide => self.finish_hide(host, in_flight.transition.to.y),
        }
        true
    }

    // ========================================================================
    // Autohide
    // ========================================================================

    fn restart_autohide(&mut self, host: &mut impl Shell) {
        if !self.destroyed {
            self.autohide.schedule_timeout(host, self.settings.autohide_delay);
        }
    }

    /// Blocks or unblocks autohide on behalf of the overlap tracker.
    ///
    /// Blocking reveals the dock unless the overview is up. Unblocking does
    /// not hide right away: a one-shot idle re-check decides once the current
    /// burst of events has settled.
    pub fn block_autohide(&mut self, host: &mut impl Shell, block: bool) {
        if self.destroyed {
            return;
        }
        self.flags.externally_blocked = block;
        self.restart_autohide(host);

        if block {
            self.recheck.cancel(host);
            if !host.overview_visible() {
                self.show(host, true);
            }
        } else {
            self.recheck.schedule_idle(host);
        }
    }

    /// Reveals the dock in response to edge pressure.
    pub fn reveal(&mut self, host: &mut impl Shell) {
        self.show(host, true);
        self.restart_autohide(host);
    }

    pub fn set_hovered(&mut self, host: &mut impl Shell, hovered: bool) {
        self.flags.hovered = hovered;
        self.restart_autohide(host);
    }

    pub fn set_menu_open(&mut self, host: &mut impl Shell, open: bool) {
        self.flags.menu_open = open;
        self.restart_autohide(host);
    }

    pub fn set_dragging_item(&mut self, host: &mut impl Shell, dragging: bool) {
        self.flags.dragging_item = dragging;
        self.restart_autohide(host);
    }

    // ========================================================================
    // Overview
    // ========================================================================

    pub fn on_overview_shown(&mut self, host: &mut impl Shell) {
        let animate = !self.is_primary;
        self.hide(host, animate);
    }

    pub fn on_overview_hiding(&mut self, host: &mut impl Shell) { self.hide(host, false); }

    pub fn on_overview_hidden(&mut self, host: &mut impl Shell) {
        if self.flags.externally_blocked {
            self.show(host, true);
        }
    }

    // ========================================================================
    // Dock Area
    // ========================================================================

    /// Recomputes the dock's frame from the work area and preferred height.
    ///
    /// Returns the new target box when `emit_target_box` is set.
    pub fn update_dock_area(&mut self, host: &mut impl Shell, emit_target_box: bool) -> Option<Rect> {
        if self.destroyed {
            return None;
        }
        let Some(work_area) = host.work_area(self.monitor) else {
            tracing::warn!(monitor = self.monitor, "visibility: work area unavailable");
            return None;
        };

        let max_height = (work_area.height * self.settings.max_height_ratio).round();
        let height = host
            .preferred_dock_height(self.monitor, work_area.width)
            .min(max_height)
            .max(0.0);
        let target_y = work_area.y + work_area.height - height;
        let frame = Rect::new(work_area.x, target_y, work_area.width, height);

        // Land any running transition before moving the resting places
        if let Some(in_flight) = self.animation.take() {
            host.cancel_animation(in_flight.id);
            self.state = match in_flight.transition.direction {
                Direction::Show => PanelVisualState::Shown,
                Direction::Hide => {
                    host.set_visible(self.monitor, false);
                    PanelVisualState::Hidden
                }
            };
            self.props = in_flight.transition.to;
        }

        self.frame = Some(frame);
        host.set_frame(self.monitor, frame);

        let props = if self.state.is_visible() {
            DockProps::shown(target_y)
        } else {
            DockProps::hidden(target_y + height, self.settings.timing.hide_scale)
        };
        host.set_props(self.monitor, props);
        self.props = props;

        tracing::debug!(monitor = self.monitor, ?frame, "visibility: dock area updated");
        emit_target_box.then_some(frame)
    }

    /// Schedules a delayed dock-area recompute after the content resized.
    pub fn on_content_resized(&mut self, host: &mut impl Shell) {
        if !self.destroyed {
            self.relayout.schedule_timeout(host, self.settings.relayout_delay);
        }
    }

    /// Handles a fired main-loop source. Returns a new target box when the
    /// delayed relayout ran.
    pub fn on_source_fired(&mut self, host: &mut impl Shell, source: SourceId) -> Option<Rect> {
        if self.destroyed {
            return None;
        }

        if self.autohide.take_fired(source) {
            if self.flags.any() {
                tracing::trace!(monitor = self.monitor, flags = ?self.flags, "visibility: autohide lapsed");
            } else {
                self.hide(host, true);
            }
            return None;
        }

        if self.recheck.take_fired(source) {
            if !self.flags.any() && !host.overview_visible() {
                self.hide(host, true);
            }
            return None;
        }

        if self.relayout.take_fired(source) {
            return self.update_dock_area(host, true);
        }

        None
    }

    /// Cancels every timer and animation. Idempotent.
    pub fn destroy(&mut self, host: &mut impl Shell) {
        if self.destroyed {
            return;
        }
        self.autohide.cancel(host);
        self.recheck.cancel(host);
        self.relayout.cancel(host);
        if let Some(in_flight) = self.animation.take() {
            host.cancel_animation(in_flight.id);
        }
        host.set_visible(self.monitor, false);
        self.destroyed = true;
    }
}
