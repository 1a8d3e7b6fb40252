//! Geometry types for the dock engine.
//!
//! All coordinates are global screen coordinates with a top-left origin, the
//! same space the window manager reports window frames and work areas in.

use serde::{Deserialize, Serialize};

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// Check if this rectangle has a positive area.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle shares a positive-area intersection with another.
    ///
    /// Rectangles that only touch along an edge or a corner do not intersect,
    /// and a degenerate (zero width or height) rectangle never intersects.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns whether the horizontal spans of two rectangles overlap.
    #[must_use]
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        other.x < self.right() && other.right() > self.x
    }
}

/// The engagement test between a window frame and the dock's target box.
///
/// Symmetric; a shared edge is not an engagement.
#[inline]
#[must_use]
pub fn is_engaged(window: &Rect, target: &Rect) -> bool { window.intersects(target) }

// ============================================================================
// Monitor Topology
// ============================================================================

/// Returns whether any other monitor sits below `monitors[index]`.
///
/// A monitor counts as "below" when its top edge is at or past the bottom
/// edge of the candidate and the two share some horizontal span. Monitors
/// that are merely diagonal neighbours do not take the bottom edge away.
#[must_use]
pub fn has_monitor_below(monitors: &[Rect], index: usize) -> bool {
    let Some(monitor) = monitors.get(index) else {
        return false;
    };
    let bottom = monitor.bottom();

    monitors
        .iter()
        .enumerate()
        .any(|(j, other)| j != index && other.y >= bottom && monitor.overlaps_horizontally(other))
}

/// Returns the indices of monitors that host a guarded bottom edge.
#[must_use]
pub fn eligible_monitors(monitors: &[Rect]) -> Vec<usize> {
    (0..monitors.len()).filter(|&i| !has_monitor_below(monitors, i)).collect()
}

// ============================================================================
// Tests
// ============================================================================
