//! Edge pressure trigger.
//!
//! A horizontal pointer barrier along the bottom edge of a monitor turns a
//! deliberate push against the screen edge into a reveal request. Accidental
//! contact (sliding along the edge, brief bumps, pushes while dragging a
//! window) must not reveal the dock.

use std::time::Duration;

use smallvec::SmallVec;

use super::geometry::Rect;
use super::host::{BarrierHit, BarrierId, BarrierSpec, Barriers, Displays};
use super::window::GrabOp;
use crate::constants::pressure::{MAX_SAMPLE, SAMPLES_INLINE_CAP};

// ============================================================================
// Pressure Accumulation
// ============================================================================

/// Rolling-window pressure accumulator for a single barrier.
///
/// Hits are accumulated while the pointer keeps pushing; samples older than
/// `timeout` fall out of the window. Once the sum reaches `threshold` the
/// barrier latches until the pointer leaves it.
#[derive(Debug, Clone)]
pub struct PressureBarrier {
    threshold: f64,
    timeout_ms: u64,
    samples: SmallVec<[(u64, f64); SAMPLES_INLINE_CAP]>,
    latched: bool,
    last_trigger_ms: Option<u64>,
}

impl PressureBarrier {
    #[must_use]
    pub fn new(threshold: f64, timeout: Duration) -> Self {
        Self {
            threshold,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            samples: SmallVec::new(),
            latched: false,
            last_trigger_ms: None,
        }
    }

    /// Current accumulated pressure within the window.
    #[must_use]
    pub fn pressure(&self) -> f64 { self.samples.iter().map(|(_, d)| d).sum() }

    #[must_use]
    pub const fn is_latched(&self) -> bool { self.latched }

    /// Feeds one barrier hit. Returns `true` when it triggers.
    pub fn on_hit(&mut self, hit: BarrierHit) -> bool {
        if self.latched {
            return false;
        }

        let distance = hit.across.abs();
        let slide = hit.along.abs();

        if distance >= self.threshold {
            return self.trigger(hit.time_ms);
        }

        // Sliding along the edge is not pushing against it
        if slide > distance {
            return false;
        }

        let cutoff = hit.time_ms.saturating_sub(self.timeout_ms);
        self.samples.retain(|(time, _)| *time >= cutoff);
        self.samples.push((hit.time_ms, distance.min(MAX_SAMPLE)));

        if self.pressure() >= self.threshold {
            return self.trigger(hit.time_ms);
        }
        false
    }

    /// The pointer left the barrier: release the latch and start over.
    pub fn on_left(&mut self) {
        self.latched = false;
        self.reset();
    }

    /// Drops all accumulated samples.
    pub fn reset(&mut self) { self.samples.clear(); }

    fn trigger(&mut self, time_ms: u64) -> bool {
        self.reset();

        let cooling_down = self
            .last_trigger_ms
            .is_some_and(|last| time_ms.saturating_sub(last) < self.timeout_ms);
        if cooling_down {
            tracing::trace!(time_ms, "hot edge: pressure reached during cooldown");
            return false;
        }

        self.latched = true;
        self.last_trigger_ms = Some(time_ms);
        true
    }
}

// ============================================================================
// Hot Edge
// ============================================================================

/// The guarded bottom edge of one monitor.
#[derive(Debug)]
pub struct HotEdge {
    monitor: usize,
    left: f64,
    bottom: f64,
    barrier: Option<BarrierId>,
    pressure: PressureBarrier,
    trigger_allowed: bool,
    destroyed: bool,
}

impl HotEdge {
    /// Creates an edge for `monitor` whose geometry is `monitor_rect`.
    /// No barrier is installed until [`Self::set_barrier_size`].
    #[must_use]
    pub fn new(monitor: usize, monitor_rect: Rect, threshold: f64, timeout: Duration) -> Self {
        Self {
            monitor,
            left: monitor_rect.x,
            bottom: monitor_rect.bottom(),
            barrier: None,
            pressure: PressureBarrier::new(threshold, timeout),
            trigger_allowed: true,
            destroyed: false,
        }
    }

    #[must_use]
    pub const fn monitor(&self) -> usize { self.monitor }

    #[must_use]
    pub const fn barrier(&self) -> Option<BarrierId> { self.barrier }

    #[must_use]
    pub const fn trigger_allowed(&self) -> bool { self.trigger_allowed }

    #[must_use]
    pub fn owns_barrier(&self, barrier: BarrierId) -> bool { self.barrier == Some(barrier) }

    /// Replaces the barrier with one `size` pixels long starting at the
    /// monitor's left edge. A size of zero removes the guard.
    pub fn set_barrier_size(&mut self, host: &mut impl Barriers, size: f64) {
        if self.destroyed {
            return;
        }
        if let Some(old) = self.barrier.take() {
            host.destroy_barrier(old);
        }
        self.pressure.on_left();

        if size > 0.0 {
            let spec = BarrierSpec {
                x1: self.left,
                x2: self.left + size,
                y: self.bottom,
            };
            let id = host.create_barrier(spec);
            tracing::debug!(monitor = self.monitor, barrier = %id, ?spec, "hot edge: barrier installed");
            self.barrier = Some(id);
        }
    }

    pub fn on_grab_begin(&mut self, op: GrabOp) {
        if op == GrabOp::Moving {
            self.trigger_allowed = false;
            self.pressure.reset();
        }
    }

    pub fn on_grab_end(&mut self, op: GrabOp) {
        if op == GrabOp::Moving {
            self.trigger_allowed = true;
            self.pressure.reset();
        }
    }

    /// Feeds a hit on `barrier`. Returns `true` when the dock should reveal.
    ///
    /// Pressure only counts in normal shell mode: while the overview is
    /// visible, hits reset the window like a move grab does.
    pub fn on_barrier_hit(
        &mut self,
        host: &impl Displays,
        barrier: BarrierId,
        hit: BarrierHit,
    ) -> bool {
        if self.destroyed || !self.owns_barrier(barrier) {
            return false;
        }
        if !self.trigger_allowed || host.overview_visible() {
            self.pressure.reset();
            return false;
        }
        let triggered = self.pressure.on_hit(hit);
        if triggered {
            tracing::debug!(monitor = self.monitor, time_ms = hit.time_ms, "hot edge: triggered");
        }
        triggered
    }

    pub fn on_barrier_left(&mut self, barrier: BarrierId) {
        if self.owns_barrier(barrier) {
            self.pressure.on_left();
        }
    }

    /// Removes the barrier. Idempotent.
    pub fn destroy(&mut self, host: &mut impl Barriers) {
        if let Some(barrier) = self.barrier.take() {
            host.destroy_barrier(barrier);
        }
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::sim::SimShell;

    const TIMEOUT: Duration = Duration::from_millis(550);

    const fn hit(time_ms: u64, across: f64) -> BarrierHit { BarrierHit { time_ms, across, along: 0.0 } }

    fn edge(sim: &mut SimShell) -> (HotEdge, BarrierId) {
        let mut edge = HotEdge::new(0, Rect::new(0.0, 0.0, 1920.0, 1080.0), 150.0, TIMEOUT);
        edge.set_barrier_size(sim, 1920.0);
        let barrier = edge.barrier().unwrap();
        (edge, barrier)
    }

    #[test]
    fn test_pressure_accumulates_to_threshold() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        for i in 0..9 {
            assert!(!pressure.on_hit(hit(i * 10, 20.0)));
        }
        // 10 samples capped at 15 reach 150
        assert!(pressure.on_hit(hit(90, 20.0)));
        assert!(pressure.is_latched());
        assert!(pressure.pressure().abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_strong_push_triggers() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        assert!(pressure.on_hit(hit(0, 200.0)));
    }

    #[test]
    fn test_sliding_is_ignored() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        for i in 0..50 {
            let sample = BarrierHit { time_ms: i * 10, across: 5.0, along: 30.0 };
            assert!(!pressure.on_hit(sample));
        }
        assert!(pressure.pressure().abs() < f64::EPSILON);
    }

    #[test]
    fn test_old_samples_are_trimmed() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        for i in 0..9 {
            pressure.on_hit(hit(i * 10, 15.0));
        }
        // Everything so far is older than the window
        assert!(!pressure.on_hit(hit(1000, 15.0)));
        assert!((pressure.pressure() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latch_released_on_leave() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        assert!(pressure.on_hit(hit(0, 200.0)));
        assert!(!pressure.on_hit(hit(1000, 200.0)));
        pressure.on_left();
        assert!(pressure.on_hit(hit(2000, 200.0)));
    }

    #[test]
    fn test_at_most_once_per_timeout_window() {
        let mut pressure = PressureBarrier::new(150.0, TIMEOUT);
        assert!(pressure.on_hit(hit(0, 200.0)));
        pressure.on_left();
        assert!(!pressure.on_hit(hit(300, 200.0)));
        pressure.on_left();
        assert!(pressure.on_hit(hit(600, 200.0)));
    }

    #[test]
    fn test_barrier_spans_monitor_bottom() {
        let mut sim = SimShell::new(vec![Rect::new(1920.0, 0.0, 2560.0, 1440.0)]);
        let mut edge = HotEdge::new(0, Rect::new(1920.0, 0.0, 2560.0, 1440.0), 150.0, TIMEOUT);
        edge.set_barrier_size(&mut sim, 2560.0);

        let barriers = sim.barriers();
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].1, BarrierSpec { x1: 1920.0, x2: 4480.0, y: 1440.0 });
    }

    #[test]
    fn test_resizing_barrier_replaces_previous() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, first) = edge(&mut sim);
        edge.set_barrier_size(&mut sim, 1000.0);

        let barriers = sim.barriers();
        assert_eq!(barriers.len(), 1);
        assert_ne!(barriers[0].0, first);

        edge.set_barrier_size(&mut sim, 0.0);
        assert!(sim.barriers().is_empty());
        assert_eq!(edge.barrier(), None);
    }

    #[test]
    fn test_no_trigger_during_move_drag() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, barrier) = edge(&mut sim);

        edge.on_grab_begin(GrabOp::Moving);
        assert!(!edge.trigger_allowed());
        for i in 0..20 {
            assert!(!edge.on_barrier_hit(&sim, barrier, hit(i * 10, 20.0)));
        }
        assert!(!edge.on_barrier_hit(&sim, barrier, hit(300, 500.0)));

        edge.on_grab_end(GrabOp::Moving);
        assert!(edge.on_barrier_hit(&sim, barrier, hit(400, 500.0)));
    }

    #[test]
    fn test_no_trigger_while_overview_visible() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, barrier) = edge(&mut sim);

        sim.set_overview_visible(true);
        for i in 0..9 {
            assert!(!edge.on_barrier_hit(&sim, barrier, hit(i * 10, 20.0)));
        }
        assert!(!edge.on_barrier_hit(&sim, barrier, hit(100, 500.0)));

        // Pushes made during the overview do not carry over.
        sim.set_overview_visible(false);
        assert!(!edge.on_barrier_hit(&sim, barrier, hit(110, 20.0)));
    }

    #[test]
    fn test_resize_grab_does_not_suppress() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, barrier) = edge(&mut sim);

        edge.on_grab_begin(GrabOp::Resizing);
        assert!(edge.on_barrier_hit(&sim, barrier, hit(0, 500.0)));
    }

    #[test]
    fn test_foreign_barrier_is_ignored() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, _) = edge(&mut sim);
        assert!(!edge.on_barrier_hit(&sim, BarrierId(999), hit(0, 500.0)));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut sim = SimShell::new(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let (mut edge, barrier) = edge(&mut sim);
        edge.destroy(&mut sim);
        edge.destroy(&mut sim);
        assert!(sim.barriers().is_empty());
        assert!(!edge.on_barrier_hit(&sim, barrier, hit(0, 500.0)));
    }
}
