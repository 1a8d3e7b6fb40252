//! Internal constants for dock tuning.
//!
//! Values here are the defaults the configuration falls back to, plus a few
//! fixed limits that are not user-configurable.
//!
//! # Organization
//!
//! - `timing` - Autohide debounce, relayout delay, transition duration
//! - `pressure` - Edge barrier pressure thresholds
//! - `layout` - Dock sizing

/// Timing constants for visibility handling.
pub mod timing {
    /// Delay before an unhovered, unblocked dock hides (ms).
    pub const AUTOHIDE_DELAY_MS: u64 = 500;

    /// Base duration of a show/hide transition (ms).
    pub const VISIBILITY_ANIMATION_MS: u64 = 200;

    /// Delay before recomputing the target box after content resizes (ms).
    ///
    /// Matches the visibility transition so a resize that ends while the
    /// pointer is over the dock does not hide it before hover registers.
    pub const RELAYOUT_DELAY_MS: u64 = 200;
}

/// Pressure barrier constants.
pub mod pressure {
    /// Accumulated pressure (px) needed to trigger a reveal.
    pub const THRESHOLD: f64 = 150.0;

    /// Rolling window for pressure samples, and the minimum gap between
    /// two reveals (ms).
    ///
    /// Slightly longer than the autohide delay so a dock that just hid is
    /// not immediately re-revealed by the same push.
    pub const TIMEOUT_MS: u64 = 550;

    /// Upper bound for a single pressure sample (px).
    pub const MAX_SAMPLE: f64 = 15.0;

    /// Inline capacity for pressure samples.
    pub const SAMPLES_INLINE_CAP: usize = 16;
}

/// Dock sizing constants.
pub mod layout {
    /// Maximum dock height as a fraction of the work area height.
    pub const MAX_HEIGHT_RATIO: f64 = 0.16;

    /// Scale the dock shrinks to while hidden.
    pub const HIDE_SCALE: f64 = 0.98;

    /// Opacity of a fully shown dock.
    pub const OPAQUE: f64 = 255.0;
}
