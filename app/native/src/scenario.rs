//! Scripted replays of desktop activity.
//!
//! A [`Scenario`] describes a monitor layout, an initial set of windows and a
//! list of timed steps. Replaying it drives a [`DockManager`] on top of a
//! [`SimShell`] and records every signal with the virtual time it was
//! produced at.
//!
//! ```json
//! {
//!   "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
//!   "windows": [{ "id": 1, "frame": { "x": 0, "y": 0, "width": 800, "height": 800 }, "monitor": 0 }],
//!   "focusApp": [1],
//!   "steps": [
//!     { "atMs": 100, "action": "set-frame", "window": 1, "frame": { "x": 0, "y": 850, "width": 800, "height": 700 } },
//!     { "atMs": 2000, "action": "push", "monitor": 0, "across": 10, "count": 20 }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LedgeConfig;
use crate::dock::{
    BarrierHit, BarrierId, DockManager, DockSignal, HostEvent, Rect, SimShell, WindowId,
    WindowSnapshot, Windows, WorkspaceId,
};
use crate::error::LedgeError;
use crate::runtime::DockState;

/// Virtual time the replay keeps running after the last step.
const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Gap between consecutive barrier hits of a push.
const DEFAULT_PUSH_INTERVAL_MS: u64 = 10;

// ============================================================================
// Scenario Description
// ============================================================================

/// A desktop layout plus a timeline of things happening on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    /// Monitor rectangles in global coordinates.
    pub monitors: Vec<Rect>,
    /// Primary monitor index. Defaults to the first monitor.
    pub primary: Option<usize>,
    /// Work areas differing from their monitor rectangle.
    pub work_areas: BTreeMap<usize, Rect>,
    /// Natural dock height reported by the dock content.
    pub preferred_height: Option<f64>,
    /// Active workspace at the start.
    pub active_workspace: Option<WorkspaceId>,
    /// Windows present at the start, bottom of the stack first.
    pub windows: Vec<WindowSnapshot>,
    /// Windows of the focused application, in preference order.
    pub focus_app: Option<Vec<WindowId>>,
    /// Timed steps. Steps sharing a timestamp run in file order.
    pub steps: Vec<Step>,
    /// How long to keep the clock running after the last step (ms).
    pub settle_ms: Option<u64>,
}

/// One timed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Virtual time of the step (ms since the start of the replay).
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Things that can happen during a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Action {
    /// Deliver a raw host notification.
    Event { event: HostEvent },
    /// Move or resize a window.
    SetFrame { window: WindowId, frame: Rect },
    /// Open a window on top of the stack.
    OpenWindow { window: WindowSnapshot },
    /// Close a window.
    CloseWindow { window: WindowId },
    /// Minimize or restore a window.
    SetMinimized { window: WindowId, minimized: bool },
    /// Change the focused application. An empty list means nothing is focused.
    Focus { windows: Vec<WindowId> },
    /// Switch the active workspace.
    SwitchWorkspace { workspace: WorkspaceId },
    /// Replace the monitor layout.
    SetMonitors { monitors: Vec<Rect> },
    /// Change the work area of a monitor.
    SetWorkArea { monitor: usize, area: Rect },
    /// Push the pointer into the bottom edge of a monitor.
    Push {
        monitor: usize,
        across: f64,
        count: u32,
        #[serde(default)]
        interval_ms: Option<u64>,
    },
    /// Move the pointer away from the bottom edge of a monitor.
    Release { monitor: usize },
    /// Move the pointer onto or off a dock.
    Hover { monitor: usize, hovered: bool },
    /// Open or close the overview.
    Overview { visible: bool },
    /// Show or hide the on-screen keyboard.
    Keyboard { visible: bool },
}

impl Action {
    /// Returns the action name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Event { .. } => "event",
            Self::SetFrame { .. } => "set-frame",
            Self::OpenWindow { .. } => "open-window",
            Self::CloseWindow { .. } => "close-window",
            Self::SetMinimized { .. } => "set-minimized",
            Self::Focus { .. } => "focus",
            Self::SwitchWorkspace { .. } => "switch-workspace",
            Self::SetMonitors { .. } => "set-monitors",
            Self::SetWorkArea { .. } => "set-work-area",
            Self::Push { .. } => "push",
            Self::Release { .. } => "release",
            Self::Hover { .. } => "hover",
            Self::Overview { .. } => "overview",
            Self::Keyboard { .. } => "keyboard",
        }
    }
}

// ============================================================================
// Replay Output
// ============================================================================

/// A signal stamped with the virtual time it was produced at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedSignal {
    pub at_ms: u64,
    #[serde(flatten)]
    pub signal: DockSignal,
}

/// Result of replaying a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    /// Every signal in production order.
    pub signals: Vec<TimedSignal>,
    /// Dock states when the replay ended.
    pub docks: Vec<DockState>,
    /// Virtual time when the replay ended (ms).
    pub ended_at_ms: u64,
}

impl Replay {
    /// Signals produced for `monitor`.
    pub fn signals_for(&self, monitor: usize) -> impl Iterator<Item = &TimedSignal> {
        self.signals.iter().filter(move |s| s.signal.monitor() == monitor)
    }

    #[must_use]
    pub fn dock(&self, monitor: usize) -> Option<&DockState> {
        self.docks.iter().find(|d| d.monitor == monitor)
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Scenario {
    /// Parses a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LedgeError::ScenarioError`] if the text is not a valid scenario.
    pub fn from_json(json: &str) -> Result<Self, LedgeError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid scenario.
    pub fn from_path(path: &Path) -> Result<Self, LedgeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<(), LedgeError> {
        if let Some(primary) = self.primary
            && primary >= self.monitors.len()
        {
            return Err(LedgeError::ScenarioError(format!(
                "primary monitor {primary} does not exist"
            )));
        }
        if let Some(monitor) = self.work_areas.keys().find(|m| **m >= self.monitors.len()) {
            return Err(LedgeError::ScenarioError(format!(
                "work area given for missing monitor {monitor}"
            )));
        }
        Ok(())
    }

    fn build_shell(&self) -> SimShell {
        let mut sim = SimShell::new(self.monitors.clone());
        if self.primary.is_some() {
            sim = sim.with_primary(self.primary);
        }
        if let Some(height) = self.preferred_height {
            sim.set_preferred_height(height);
        }
        if self.active_workspace.is_some() {
            sim.set_active_workspace(self.active_workspace);
        }
        for (monitor, area) in &self.work_areas {
            sim.set_work_area(*monitor, Some(*area));
        }
        for window in &self.windows {
            sim.add_window(window.clone());
        }
        if let Some(app) = &self.focus_app {
            sim.set_focus_app(app.clone());
        }
        sim
    }
}

// ============================================================================
// Replaying
// ============================================================================

/// Drives a manager through a scenario's timeline.
struct Replayer {
    sim: SimShell,
    manager: DockManager,
    signals: Vec<TimedSignal>,
}

impl Replayer {
    fn record(&mut self) {
        let at_ms = self.sim.now_ms();
        let drained = self.manager.drain_signals();
        self.signals.extend(drained.into_iter().map(|signal| TimedSignal { at_ms, signal }));
    }

    /// Runs every timer and animation due up to `time`.
    fn run_until(&mut self, time: Duration) {
        while let Some(event) = self.sim.next_due(time) {
            self.manager.handle_event(&mut self.sim, event);
            self.record();
        }
        self.sim.advance_to(time);
    }

    fn deliver(&mut self, events: impl IntoIterator<Item = HostEvent>) {
        for event in events {
            self.manager.handle_event(&mut self.sim, event);
            self.record();
        }
    }

    fn require_window(&self, window: WindowId) -> Result<WindowSnapshot, LedgeError> {
        self.sim
            .window(window)
            .ok_or_else(|| LedgeError::ScenarioError(format!("unknown window {window}")))
    }

    fn apply(&mut self, step: &Step) -> Result<(), LedgeError> {
        tracing::trace!(at_ms = step.at_ms, action = step.action.name(), "scenario: step");

        match &step.action {
            Action::Event { event } => self.deliver([event.clone()]),
            Action::SetFrame { window, frame } => {
                self.require_window(*window)?;
                let events = self.sim.set_window_frame(*window, *frame);
                self.deliver(events);
            }
            Action::OpenWindow { window } => {
                let monitor = window.monitor;
                let id = window.id;
                self.sim.add_window(window.clone());
                self.deliver([
                    HostEvent::WindowEnteredMonitor { window: id, monitor },
                    HostEvent::Restacked,
                ]);
            }
            Action::CloseWindow { window } => {
                let monitor = self.require_window(*window)?.monitor;
                self.sim.remove_window(*window);
                self.deliver([
                    HostEvent::WindowLeftMonitor { window: *window, monitor },
                    HostEvent::Restacked,
                ]);
            }
            Action::SetMinimized { window, minimized } => {
                self.require_window(*window)?;
                let minimized = *minimized;
                let events = self.sim.update_window(*window, |w| w.minimized = minimized);
                self.deliver(events);
                self.deliver([HostEvent::Restacked]);
            }
            Action::Focus { windows } => {
                if windows.is_empty() {
                    self.sim.clear_focus_app();
                } else {
                    self.sim.set_focus_app(windows.clone());
                }
                self.deliver([HostEvent::FocusChanged]);
            }
            Action::SwitchWorkspace { workspace } => {
                self.sim.set_active_workspace(Some(*workspace));
                self.deliver([HostEvent::ActiveWorkspaceChanged]);
            }
            Action::SetMonitors { monitors } => {
                self.sim.set_monitors(monitors.clone());
                self.deliver([HostEvent::MonitorsChanged]);
            }
            Action::SetWorkArea { monitor, area } => {
                self.sim.set_work_area(*monitor, Some(*area));
                self.deliver([HostEvent::WorkAreasChanged]);
            }
            Action::Push { monitor, across, count, interval_ms } => {
                let interval = interval_ms.unwrap_or(DEFAULT_PUSH_INTERVAL_MS);
                self.push(*monitor, *across, *count, interval)?;
            }
            Action::Release { monitor } => {
                let barrier = self.barrier_of(*monitor)?;
                self.deliver([HostEvent::BarrierLeft { barrier }]);
            }
            Action::Hover { monitor, hovered } => {
                self.deliver([HostEvent::HoverChanged { monitor: *monitor, hovered: *hovered }]);
            }
            Action::Overview { visible } => {
                self.sim.set_overview_visible(*visible);
                if *visible {
                    self.deliver([HostEvent::OverviewShown]);
                } else {
                    self.deliver([HostEvent::OverviewHiding, HostEvent::OverviewHidden]);
                }
            }
            Action::Keyboard { visible } => {
                self.deliver([HostEvent::KeyboardVisibilityChanged { visible: *visible }]);
            }
        }
        Ok(())
    }

    fn barrier_of(&self, monitor: usize) -> Result<BarrierId, LedgeError> {
        self.manager
            .dock(monitor)
            .and_then(|dock| dock.hot_edge().barrier())
            .ok_or_else(|| {
                LedgeError::ScenarioError(format!("monitor {monitor} has no edge barrier"))
            })
    }

    /// Delivers `count` barrier hits spaced `interval_ms` apart.
    fn push(
        &mut self,
        monitor: usize,
        across: f64,
        count: u32,
        interval_ms: u64,
    ) -> Result<(), LedgeError> {
        for i in 0..count {
            if i > 0 {
                let next = self.sim.now() + Duration::from_millis(interval_ms);
                self.run_until(next);
            }
            // The barrier can be replaced by a rebuild triggered mid-push.
            let barrier = self.barrier_of(monitor)?;
            let hit = BarrierHit { time_ms: self.sim.now_ms(), across, along: 0.0 };
            self.deliver([HostEvent::BarrierHit { barrier, hit }]);
        }
        Ok(())
    }

    fn finish(mut self) -> Replay {
        self.record();
        let docks = self
            .manager
            .docks()
            .iter()
            .map(|dock| DockState {
                monitor: dock.monitor(),
                visibility: dock.visibility().state(),
                overlap: dock.tracker().status(),
                flags: dock.visibility().flags(),
                target_box: dock.visibility().frame(),
            })
            .collect();

        Replay { signals: self.signals, docks, ended_at_ms: self.sim.now_ms() }
    }
}

/// Replays `scenario` with `config`.
///
/// # Errors
///
/// Returns [`LedgeError::ScenarioError`] if a step refers to a window or
/// monitor that does not exist at that point of the timeline.
pub fn replay(scenario: &Scenario, config: &LedgeConfig) -> Result<Replay, LedgeError> {
    let mut sim = scenario.build_shell();
    let manager = DockManager::new(&mut sim, config.clone());
    let mut replayer = Replayer { sim, manager, signals: Vec::new() };
    replayer.record();

    let mut steps: Vec<&Step> = scenario.steps.iter().collect();
    steps.sort_by_key(|step| step.at_ms);

    for step in steps {
        replayer.run_until(Duration::from_millis(step.at_ms));
        replayer.apply(step)?;
    }

    let settle = Duration::from_millis(scenario.settle_ms.unwrap_or(DEFAULT_SETTLE_MS));
    let end = replayer.sim.now() + settle;
    replayer.run_until(end);

    tracing::debug!(signals = replayer.signals.len(), "scenario: replay finished");
    Ok(replayer.finish())
}
