//! Benchmarks for the dock engine's hot paths.
//!
//! Run with: `cargo bench -p ledge`
//!
//! Results are saved to `target/criterion/` with HTML reports.
//!
//! ## Benchmark Groups
//!
//! - `overlap`: Overlap recomputation with a focused app and the fallback scan
//! - `pressure`: Pressure accumulation over a burst of barrier hits
//! - `topology`: Monitor eligibility for growing layouts
//! - `replay`: A full scenario replay on the in-memory host

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ledge_lib::config::LedgeConfig;
use ledge_lib::dock::{
    BarrierHit, IntellihideTracker, PressureBarrier, Rect, SimShell, WindowSnapshot,
    eligible_monitors,
};
use ledge_lib::scenario::{self, Scenario};

// ============================================================================
// Test Data
// ============================================================================

fn screen_1080p() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

fn target_box() -> Rect { Rect::new(0.0, 1016.0, 1920.0, 64.0) }

/// A desktop with `count` windows tiled across the top half of the screen.
fn desktop(count: u64) -> SimShell {
    let mut sim = SimShell::new(vec![screen_1080p()]);
    for id in 1..=count {
        #[allow(clippy::cast_precision_loss)]
        let x = (id % 16) as f64 * 100.0;
        sim.add_window(WindowSnapshot::new(id, Rect::new(x, 0.0, 100.0, 400.0), 0));
    }
    sim
}

/// A grid of `side` x `side` monitors.
fn monitor_grid(side: u32) -> Vec<Rect> {
    let mut monitors = Vec::new();
    for row in 0..side {
        for col in 0..side {
            monitors.push(Rect::new(
                f64::from(col) * 1920.0,
                f64::from(row) * 1080.0,
                1920.0,
                1080.0,
            ));
        }
    }
    monitors
}

// ============================================================================
// Overlap Benchmarks
// ============================================================================

fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap");

    for count in [1, 8, 32, 128] {
        let mut sim = desktop(count);
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut sim, target_box());

        group.bench_with_input(BenchmarkId::new("fallback_scan", count), &count, |b, _| {
            b.iter(|| black_box(tracker.on_windows_changed(&mut sim)));
        });

        let mut focused = desktop(count);
        focused.set_focus_app(vec![count]);
        let mut tracker = IntellihideTracker::new(0);
        tracker.set_target_box(&mut focused, target_box());

        group.bench_with_input(BenchmarkId::new("focused_app", count), &count, |b, _| {
            b.iter(|| black_box(tracker.on_windows_changed(&mut focused)));
        });
    }

    group.finish();
}

// ============================================================================
// Pressure Benchmarks
// ============================================================================

fn bench_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("pressure");

    group.bench_function("burst_to_trigger", |b| {
        b.iter(|| {
            let mut barrier = PressureBarrier::new(150.0, Duration::from_millis(550));
            let mut time_ms = 0;
            while !barrier.on_hit(BarrierHit { time_ms, across: black_box(5.0), along: 0.0 }) {
                time_ms += 8;
            }
            black_box(time_ms)
        });
    });

    group.bench_function("slow_push_expiring", |b| {
        b.iter(|| {
            let mut barrier = PressureBarrier::new(150.0, Duration::from_millis(550));
            for i in 0..200 {
                barrier.on_hit(BarrierHit { time_ms: i * 100, across: black_box(4.0), along: 0.0 });
            }
            black_box(barrier.pressure())
        });
    });

    group.finish();
}

// ============================================================================
// Topology Benchmarks
// ============================================================================

fn bench_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");

    for side in [1, 2, 4, 8] {
        let monitors = monitor_grid(side);
        group.bench_with_input(BenchmarkId::new("eligible_monitors", side * side), &side, |b, _| {
            b.iter(|| eligible_monitors(black_box(&monitors)));
        });
    }

    group.finish();
}

// ============================================================================
// Replay Benchmarks
// ============================================================================

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    let scenario = Scenario::from_json(
        r#"{
          "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
          "windows": [{ "id": 1, "frame": { "x": 0, "y": 0, "width": 800, "height": 800 }, "monitor": 0 }],
          "focusApp": [1],
          "steps": [
            { "atMs": 100, "action": "set-frame", "window": 1, "frame": { "x": 0, "y": 850, "width": 800, "height": 700 } },
            { "atMs": 2000, "action": "push", "monitor": 0, "across": 10, "count": 20 },
            { "atMs": 4000, "action": "set-frame", "window": 1, "frame": { "x": 0, "y": 0, "width": 800, "height": 800 } }
          ]
        }"#,
    )
    .unwrap_or_default();
    let config = LedgeConfig::default();

    group.bench_function("overlap_push_clear", |b| {
        b.iter(|| scenario::replay(black_box(&scenario), &config).map(|r| r.signals.len()));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_overlap, bench_pressure, bench_topology, bench_replay);

criterion_main!(benches);
