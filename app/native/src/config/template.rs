//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Ledge Configuration File
// =========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Dock Visibility
  // ============================================================================
  // "dock": {
  //   // Milliseconds an unhovered dock waits before hiding
  //   "autohideDelayMs": 500,
  //
  //   // Maximum dock height as a fraction of the work area height, in (0, 1]
  //   "maxHeightRatio": 0.16,
  //
  //   // Milliseconds to wait after the dock content resized before
  //   // recomputing the dock area
  //   "relayoutDelayMs": 200
  // },

  // ============================================================================
  // Edge Pressure
  // ============================================================================
  // Pushing the pointer against the bottom screen edge reveals the dock.
  // "pressure": {
  //   // Pixels of accumulated pressure needed to reveal
  //   "threshold": 150,
  //
  //   // Rolling pressure window in milliseconds; also the minimum time
  //   // between two reveals
  //   "timeoutMs": 550
  // },

  // ============================================================================
  // Animation
  // ============================================================================
  // "animation": {
  //   // Base show/hide duration in milliseconds (0 disables animation)
  //   "durationMs": 200,
  //
  //   // Scale the dock shrinks to while hidden, in (0, 1]
  //   "hideScale": 0.98
  // }
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgeConfig;

    #[test]
    fn test_generate_config_template_parses_to_defaults() {
        let template = generate_config_template();
        let stripped = json_comments::StripComments::new(template.as_bytes());
        let config: LedgeConfig = serde_json::from_reader(stripped).unwrap();
        assert_eq!(config, LedgeConfig::default());
    }

    #[test]
    fn test_generate_config_template_contains_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("\"dock\""));
        assert!(template.contains("\"pressure\""));
        assert!(template.contains("\"animation\""));
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledge").join("config.jsonc");
        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
