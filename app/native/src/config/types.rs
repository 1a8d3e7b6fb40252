//! Configuration types for Ledge.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{layout, pressure, timing};

/// Dock visibility configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DockConfig {
    /// Delay in milliseconds before an unhovered dock hides.
    /// Default: 500
    pub autohide_delay_ms: u64,

    /// Maximum dock height as a fraction of the work area height.
    /// Values outside (0, 1] are clamped.
    /// Default: 0.16
    pub max_height_ratio: f64,

    /// Delay in milliseconds before the dock area is recomputed after its
    /// content finished resizing.
    /// Default: 200
    pub relayout_delay_ms: u64,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            autohide_delay_ms: timing::AUTOHIDE_DELAY_MS,
            max_height_ratio: layout::MAX_HEIGHT_RATIO,
            relayout_delay_ms: timing::RELAYOUT_DELAY_MS,
        }
    }
}

/// Edge pressure barrier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PressureConfig {
    /// Accumulated pointer pressure (pixels) needed to reveal the dock.
    /// Default: 150
    pub threshold: f64,

    /// Rolling window in milliseconds for pressure samples. Also the minimum
    /// time between two reveals.
    /// Default: 550
    pub timeout_ms: u64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            threshold: pressure::THRESHOLD,
            timeout_ms: pressure::TIMEOUT_MS,
        }
    }
}

/// Show/hide animation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Base duration in milliseconds for show/hide transitions.
    /// Default: 200
    pub duration_ms: u64,

    /// Scale the dock shrinks to while hidden. Values outside (0, 1] are clamped.
    /// Default: 0.98
    pub hide_scale: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: timing::VISIBILITY_ANIMATION_MS,
            hide_scale: layout::HIDE_SCALE,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgeConfig {
    /// Dock visibility settings.
    pub dock: DockConfig,

    /// Edge pressure settings.
    pub pressure: PressureConfig,

    /// Animation settings.
    pub animation: AnimationConfig,
}

impl LedgeConfig {
    /// Returns a copy with out-of-range values clamped to usable ones.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if !(self.dock.max_height_ratio > 0.0 && self.dock.max_height_ratio <= 1.0) {
            tracing::warn!(
                value = self.dock.max_height_ratio,
                "maxHeightRatio out of range, using default"
            );
            self.dock.max_height_ratio = layout::MAX_HEIGHT_RATIO;
        }

        if !(self.animation.hide_scale > 0.0 && self.animation.hide_scale <= 1.0) {
            tracing::warn!(value = self.animation.hide_scale, "hideScale out of range, using default");
            self.animation.hide_scale = layout::HIDE_SCALE;
        }

        if !(self.pressure.threshold > 0.0) {
            tracing::warn!(value = self.pressure.threshold, "pressure threshold must be positive");
            self.pressure.threshold = pressure::THRESHOLD;
        }

        self
    }

    #[must_use]
    pub const fn autohide_delay(&self) -> Duration { Duration::from_millis(self.dock.autohide_delay_ms) }

    #[must_use]
    pub const fn relayout_delay(&self) -> Duration { Duration::from_millis(self.dock.relayout_delay_ms) }

    #[must_use]
    pub const fn pressure_timeout(&self) -> Duration { Duration::from_millis(self.pressure.timeout_ms) }

    #[must_use]
    pub const fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation.duration_ms)
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/ledge/config.jsonc, \
         ~/.config/ledge/config.json, or ~/.ledge.json"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".ledge.jsonc", ".ledge.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/ledge/config.jsonc` or `config.json`
/// 2. `~/.config/ledge/config.jsonc` or `config.json`
/// 3. The platform config directory (`dirs::config_dir()`)
/// 4. `~/.ledge.jsonc` or `~/.ledge.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let ledge_dir = PathBuf::from(xdg_config).join("ledge");
        for filename in CONFIG_FILE_NAMES {
            paths.push(ledge_dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let ledge_dir = home.join(".config").join("ledge");
        for filename in CONFIG_FILE_NAMES {
            let path = ledge_dir.join(filename);
            // XDG_CONFIG_HOME might be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let ledge_dir = config_dir.join("ledge");
        for filename in CONFIG_FILE_NAMES {
            let path = ledge_dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads and validates the configuration at `path`.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it could not be read, and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(LedgeConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: LedgeConfig = serde_json::from_reader(reader)?;
    Ok((config.validated(), path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the error from reading the first one found.
pub fn load_config() -> Result<(LedgeConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}
