//! Dock actor runtime.
//!
//! The dock actor owns a [`DockManager`] and a host backend and processes
//! messages sequentially, so the single-threaded engine can be driven from
//! any number of tasks. Main-loop sources and animation completions are
//! tokio tasks that post back into the actor's own queue.
//!
//! # Panic Recovery
//!
//! If a message handler panics, the panic is caught and logged and the actor
//! keeps processing subsequent messages.

mod handle;
mod messages;

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

pub use handle::{ActorError, DockHandle};
pub use messages::{DockMessage, DockQuery, DockSnapshot, DockState, QueryResult};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LedgeConfig;
use crate::dock::{
    AnimationId, Animator, BarrierId, BarrierSpec, Barriers, DockManager, DockProps, DockSignal,
    DockTransition, Displays, HostEvent, MainLoop, Rect, SourceId, SubscriptionId, WindowId,
    WindowSnapshot, Windows, WorkspaceId,
};

/// Channel buffer size for the dock actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Everything a host integration provides to the actor. Scheduling is
/// supplied by the runtime itself.
pub trait Backend: Windows + Displays + Barriers + Animator + Send + 'static {}

impl<T> Backend for T where T: Windows + Displays + Barriers + Animator + Send + 'static {}

// ============================================================================
// Runtime Host
// ============================================================================

/// A backend paired with tokio-driven scheduling.
struct RuntimeHost<B> {
    backend: B,
    sender: mpsc::WeakSender<DockMessage>,
    next_source: u64,
    sources: HashMap<SourceId, JoinHandle<()>>,
    animations: HashMap<AnimationId, JoinHandle<()>>,
}

impl<B: Backend> RuntimeHost<B> {
    fn new(backend: B, sender: mpsc::WeakSender<DockMessage>) -> Self {
        Self {
            backend,
            sender,
            next_source: 0,
            sources: HashMap::new(),
            animations: HashMap::new(),
        }
    }

    /// Spawns a task that posts `event` after `delay`.
    fn post_after(&self, delay: Option<Duration>, event: HostEvent) -> JoinHandle<()> {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(DockMessage::Host(event)).await;
            }
        })
    }

    fn schedule(&mut self, delay: Option<Duration>) -> SourceId {
        self.next_source += 1;
        let id = SourceId(self.next_source);
        let task = self.post_after(delay, HostEvent::SourceFired { source: id });
        self.sources.insert(id, task);
        id
    }

    /// Drops bookkeeping for a source or animation that just delivered.
    fn forget(&mut self, event: &HostEvent) {
        match event {
            HostEvent::SourceFired { source } => {
                self.sources.remove(source);
            }
            HostEvent::AnimationCompleted { animation } => {
                self.animations.remove(animation);
            }
            _ => {}
        }
    }

    fn abort_all(&mut self) {
        for (_, task) in self.sources.drain() {
            task.abort();
        }
        for (_, task) in self.animations.drain() {
            task.abort();
        }
    }
}

impl<B: Backend> Windows for RuntimeHost<B> {
    fn windows_on_monitor(&self, monitor: usize) -> Vec<WindowSnapshot> {
        self.backend.windows_on_monitor(monitor)
    }

    fn focus_app_windows(&self) -> Option<Vec<WindowSnapshot>> { self.backend.focus_app_windows() }

    fn window(&self, id: WindowId) -> Option<WindowSnapshot> { self.backend.window(id) }

    fn active_workspace(&self) -> Option<WorkspaceId> { self.backend.active_workspace() }

    fn watch_frame(&mut self, window: WindowId) -> SubscriptionId { self.backend.watch_frame(window) }

    fn unwatch_frame(&mut self, subscription: SubscriptionId) {
        self.backend.unwatch_frame(subscription);
    }
}

impl<B: Backend> Displays for RuntimeHost<B> {
    fn monitors(&self) -> Vec<Rect> { self.backend.monitors() }

    fn primary_monitor(&self) -> Option<usize> { self.backend.primary_monitor() }

    fn work_area(&self, monitor: usize) -> Option<Rect> { self.backend.work_area(monitor) }

    fn overview_visible(&self) -> bool { self.backend.overview_visible() }

    fn preferred_dock_height(&self, monitor: usize, width: f64) -> f64 {
        self.backend.preferred_dock_height(monitor, width)
    }
}

impl<B: Backend> Barriers for RuntimeHost<B> {
    fn create_barrier(&mut self, spec: BarrierSpec) -> BarrierId { self.backend.create_barrier(spec) }

    fn destroy_barrier(&mut self, barrier: BarrierId) { self.backend.destroy_barrier(barrier); }
}

impl<B: Backend> Animator for RuntimeHost<B> {
    fn ease(&mut self, monitor: usize, transition: &DockTransition) -> AnimationId {
        let id = self.backend.ease(monitor, transition);
        let task = self.post_after(
            Some(transition.total_duration()),
            HostEvent::AnimationCompleted { animation: id },
        );
        self.animations.insert(id, task);
        id
    }

    fn cancel_animation(&mut self, animation: AnimationId) -> Option<DockProps> {
        if let Some(task) = self.animations.remove(&animation) {
            task.abort();
        }
        self.backend.cancel_animation(animation)
    }

    fn set_props(&mut self, monitor: usize, props: DockProps) { self.backend.set_props(monitor, props); }

    fn set_visible(&mut self, monitor: usize, visible: bool) {
        self.backend.set_visible(monitor, visible);
    }

    fn set_frame(&mut self, monitor: usize, frame: Rect) { self.backend.set_frame(monitor, frame); }
}

impl<B: Backend> MainLoop for RuntimeHost<B> {
    fn timeout_add(&mut self, delay: Duration) -> SourceId { self.schedule(Some(delay)) }

    fn idle_add(&mut self) -> SourceId { self.schedule(None) }

    fn source_remove(&mut self, source: SourceId) {
        if let Some(task) = self.sources.remove(&source) {
            task.abort();
        }
    }
}

// ============================================================================
// Dock Actor
// ============================================================================

/// The actor that owns the dock engine.
pub struct DockActor<B> {
    host: RuntimeHost<B>,
    config: LedgeConfig,
    manager: Option<DockManager>,
    signals: Vec<DockSignal>,
    snapshot: Arc<RwLock<DockSnapshot>>,
    receiver: mpsc::Receiver<DockMessage>,
}

impl<B: Backend> DockActor<B> {
    /// Spawn a new dock actor and return a handle for communication.
    ///
    /// Docks are not built until [`DockHandle::enable`] is called. Must be
    /// called from within a tokio runtime.
    #[must_use]
    pub fn spawn(backend: B, config: LedgeConfig) -> DockHandle {
        tracing::debug!("dock: spawning actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let snapshot = Arc::new(RwLock::new(DockSnapshot::default()));

        let actor = Self {
            host: RuntimeHost::new(backend, sender.downgrade()),
            config,
            manager: None,
            signals: Vec::new(),
            snapshot: Arc::clone(&snapshot),
            receiver,
        };

        tokio::spawn(actor.run());

        DockHandle::new(sender, snapshot)
    }

    /// Run the actor's message loop.
    async fn run(mut self) {
        tracing::trace!("dock: actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, DockMessage::Shutdown) {
                tracing::debug!("dock: actor received shutdown message");
                break;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(message = msg_name, panic = %panic_msg, "dock: actor recovered from panic");
            }
        }

        self.disable();
        self.host.abort_all();
        tracing::debug!("dock: actor exiting");
    }

    /// Handle a single message.
    fn handle_message(&mut self, msg: DockMessage) {
        match msg {
            DockMessage::Host(event) => {
                self.host.forget(&event);
                if let Some(manager) = self.manager.as_mut() {
                    manager.handle_event(&mut self.host, event);
                } else {
                    tracing::trace!(event = event.name(), "dock: disabled, ignoring event");
                }
            }
            DockMessage::Enable => self.enable(),
            DockMessage::Disable => self.disable(),
            DockMessage::Show { monitor, animate } => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.show(&mut self.host, monitor, animate);
                }
            }
            DockMessage::Hide { monitor, animate } => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.hide(&mut self.host, monitor, animate);
                }
            }
            DockMessage::BlockAutohide { monitor, block } => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.block_autohide(&mut self.host, monitor, block);
                }
            }
            DockMessage::Query { query, respond_to } => {
                self.collect_signals();
                let result = self.execute_query(query);
                if respond_to.send(result).is_err() {
                    tracing::warn!("dock: failed to send query response (channel closed)");
                }
            }
            DockMessage::Shutdown => {}
        }

        self.collect_signals();
        self.publish();
    }

    fn enable(&mut self) {
        if self.manager.is_some() {
            return;
        }
        tracing::debug!("dock: enabling");
        self.manager = Some(DockManager::new(&mut self.host, self.config.clone()));
    }

    fn disable(&mut self) {
        if let Some(mut manager) = self.manager.take() {
            tracing::debug!("dock: disabling");
            manager.destroy(&mut self.host);
            self.signals.extend(manager.drain_signals());
        }
    }

    fn collect_signals(&mut self) {
        if let Some(manager) = self.manager.as_mut() {
            self.signals.extend(manager.drain_signals());
        }
    }

    fn execute_query(&mut self, query: DockQuery) -> QueryResult {
        match query {
            DockQuery::Snapshot => QueryResult::Snapshot(self.build_snapshot()),
            DockQuery::DrainSignals => QueryResult::Signals(std::mem::take(&mut self.signals)),
            DockQuery::Enabled => QueryResult::Enabled(self.manager.is_some()),
        }
    }

    fn build_snapshot(&self) -> DockSnapshot {
        let docks = self
            .manager
            .as_ref()
            .map(|manager| {
                manager
                    .docks()
                    .iter()
                    .map(|dock| DockState {
                        monitor: dock.monitor(),
                        visibility: dock.visibility().state(),
                        overlap: dock.tracker().status(),
                        flags: dock.visibility().flags(),
                        target_box: dock.visibility().frame(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        DockSnapshot { enabled: self.manager.is_some(), docks }
    }

    fn publish(&self) {
        let snapshot = self.build_snapshot();
        *self.snapshot.write() = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::{OverlapStatus, PanelVisualState, SimShell, WindowSnapshot};

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

    fn spawn_with(sim: SimShell) -> DockHandle { DockActor::spawn(sim, LedgeConfig::default()) }

    #[tokio::test(start_paused = true)]
    async fn test_actor_starts_disabled() {
        let handle = spawn_with(SimShell::new(vec![SCREEN]));
        assert!(!handle.is_enabled().await.unwrap());

        let snapshot = handle.query(DockQuery::Snapshot).await.unwrap().into_snapshot().unwrap();
        assert!(snapshot.docks.is_empty());
        handle.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_reveals_unobstructed_dock() {
        let handle = spawn_with(SimShell::new(vec![SCREEN]));
        handle.enable().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = handle.query(DockQuery::Snapshot).await.unwrap().into_snapshot().unwrap();
        let dock = snapshot.dock(0).unwrap();
        assert_eq!(dock.visibility, PanelVisualState::Shown);
        assert_eq!(dock.overlap, OverlapStatus::NoOverlap);
        assert_eq!(handle.snapshot(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlap_hides_after_timers() {
        let mut sim = SimShell::new(vec![SCREEN]);
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);

        let handle = spawn_with(sim);
        handle.enable().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snapshot = handle.query(DockQuery::Snapshot).await.unwrap().into_snapshot().unwrap();
        let dock = snapshot.dock(0).unwrap();
        assert_eq!(dock.overlap, OverlapStatus::Overlapping);
        assert_eq!(dock.visibility, PanelVisualState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_keeps_dock_until_left() {
        let mut sim = SimShell::new(vec![SCREEN]);
        sim.add_window(WindowSnapshot::new(1, Rect::new(0.0, 850.0, 800.0, 700.0), 0));
        sim.set_focus_app(vec![1]);

        let handle = spawn_with(sim);
        handle.enable().unwrap();
        handle.show(0, false).unwrap();
        handle.post(HostEvent::HoverChanged { monitor: 0, hovered: true }).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.snapshot().dock(0).unwrap().visibility, PanelVisualState::Shown);

        handle.post(HostEvent::HoverChanged { monitor: 0, hovered: false }).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = handle.is_enabled().await.unwrap();
        assert_eq!(handle.snapshot().dock(0).unwrap().visibility, PanelVisualState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_tears_down_and_ignores_events() {
        let handle = spawn_with(SimShell::new(vec![SCREEN]));
        handle.enable().unwrap();
        handle.disable().unwrap();
        handle.post(HostEvent::MonitorsChanged).unwrap();

        assert!(!handle.is_enabled().await.unwrap());
        let signals = handle.drain_signals().await.unwrap();
        assert!(signals.iter().any(|s| matches!(s, DockSignal::TargetBoxUpdated { .. })));
        assert!(handle.drain_signals().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_channel() {
        let handle = spawn_with(SimShell::new(vec![SCREEN]));
        handle.shutdown().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_alive());
    }
}
