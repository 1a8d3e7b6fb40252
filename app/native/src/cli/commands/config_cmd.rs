//! Config CLI commands.
//!
//! Commands for inspecting and creating the Ledge configuration file.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::LedgeError;

/// Arguments of `ledge config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print a configuration template with every option commented out.
    #[arg(long)]
    pub template: bool,

    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Create a configuration file with all options documented.
    #[command(after_long_help = r#"Examples:
  ledge config init              # Create config at default location
  ledge config init --force      # Overwrite existing config
  ledge config init --path ~/my-config.jsonc"#)]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses the first search path.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Show the configuration search paths and which one is in use.
    Path,
}

/// Execute `ledge config`.
///
/// Without a subcommand, prints the resolved configuration.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(args: &ConfigArgs) -> Result<(), LedgeError> {
    if args.template {
        println!("{}", generate_config_template());
        return Ok(());
    }

    match &args.command {
        None => show_config(),
        Some(ConfigCommands::Init { force, path }) => init_config(*force, path.clone()),
        Some(ConfigCommands::Path) => {
            show_config_path();
            Ok(())
        }
    }
}

/// Print the resolved configuration as JSON.
fn show_config() -> Result<(), LedgeError> {
    let value = serde_json::to_value(config::get_config())
        .map_err(|e| LedgeError::ConfigError(e.to_string()))?;
    output::print_highlighted_json(&value);
    Ok(())
}

fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), LedgeError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(LedgeError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        LedgeError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let paths = config_paths();
    let mut found_config = false;

    for (i, path) in paths.iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'ledge config init' to create one.");
    }
}
