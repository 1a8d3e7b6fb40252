//! Dock show/hide transitions.
//!
//! The dock itself never drives frames. It describes where each property
//! should end up and how long it should take, and hands the description to
//! the host animator, which reports completion back as an event.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::layout::OPAQUE;

// ============================================================================
// Easing Functions
// ============================================================================

/// Linear interpolation between two values.
#[inline]
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 { (end - start).mul_add(t, start) }

/// Cubic ease-in (slow start, accelerates).
#[inline]
#[must_use]
pub fn ease_in_cubic(t: f64) -> f64 { t * t * t }

/// Cubic ease-out (fast start, decelerates).
#[inline]
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t1 = t - 1.0;
    (t1 * t1).mul_add(t1, 1.0)
}

/// Animation curve for a property track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationMode {
    #[default]
    Linear,
    EaseInCubic,
    EaseOutCubic,
}

impl AnimationMode {
    /// Applies the curve to normalized progress.
    #[inline]
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInCubic => ease_in_cubic(t),
            Self::EaseOutCubic => ease_out_cubic(t),
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

/// The animatable properties of a dock actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockProps {
    /// Vertical position of the dock's top edge.
    pub y: f64,
    /// Uniform scale around the bottom-center pivot.
    pub scale: f64,
    /// Opacity, 0 to 255.
    pub opacity: f64,
}

impl DockProps {
    /// Fully revealed properties at `y`.
    #[must_use]
    pub const fn shown(y: f64) -> Self { Self { y, scale: 1.0, opacity: OPAQUE } }

    /// Fully hidden properties at `y`.
    #[must_use]
    pub const fn hidden(y: f64, scale: f64) -> Self { Self { y, scale, opacity: 0.0 } }
}

// ============================================================================
// Transitions
// ============================================================================

/// Direction of a visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Show,
    Hide,
}

/// One eased property group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub duration: Duration,
    pub mode: AnimationMode,
}

impl Track {
    /// Normalized, eased progress after `elapsed`.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.mode.apply(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }
}

/// A complete show or hide transition.
///
/// Scale and opacity share the `visual` track, the vertical slide runs on the
/// `slide` track. The transition completes when the longer track finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockTransition {
    pub direction: Direction,
    pub from: DockProps,
    pub to: DockProps,
    pub visual: Track,
    pub slide: Track,
}

/// Timing parameters for visibility transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    /// Base duration for a visibility transition.
    pub duration: Duration,
    /// Scale the dock shrinks to while hidden.
    pub hide_scale: f64,
}

impl DockTransition {
    /// Builds the reveal transition from `from` to fully shown at `show_y`.
    ///
    /// Opacity and scale ease in over the full duration, the slide is a
    /// little faster so the dock is in place before it is fully opaque.
    #[must_use]
    pub fn show(from: DockProps, show_y: f64, timing: TransitionTiming) -> Self {
        Self {
            direction: Direction::Show,
            from,
            to: DockProps::shown(show_y),
            visual: Track {
                duration: timing.duration,
                mode: AnimationMode::EaseInCubic,
            },
            slide: Track {
                duration: timing.duration.mul_f64(0.8),
                mode: AnimationMode::Linear,
            },
        }
    }

    /// Builds the hide transition from `from` to fully hidden at `hide_y`.
    #[must_use]
    pub fn hide(from: DockProps, hide_y: f64, timing: TransitionTiming) -> Self {
        Self {
            direction: Direction::Hide,
            from,
            to: DockProps::hidden(hide_y, timing.hide_scale),
            visual: Track {
                duration: timing.duration.mul_f64(0.8),
                mode: AnimationMode::EaseOutCubic,
            },
            slide: Track {
                duration: timing.duration,
                mode: AnimationMode::Linear,
            },
        }
    }

    /// Total time until both tracks have finished.
    #[must_use]
    pub fn total_duration(&self) -> Duration { self.visual.duration.max(self.slide.duration) }

    /// Samples the properties after `elapsed`.
    #[must_use]
    pub fn sample(&self, elapsed: Duration) -> DockProps {
        let visual = self.visual.progress(elapsed);
        let slide = self.slide.progress(elapsed);
        DockProps {
            y: lerp(self.from.y, self.to.y, slide),
            scale: lerp(self.from.scale, self.to.scale, visual),
            opacity: lerp(self.from.opacity, self.to.opacity, visual),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
