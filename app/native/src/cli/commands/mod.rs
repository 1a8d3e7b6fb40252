//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file commands
//! - `simulate` - Scenario replay
//! - `topology` - Monitor eligibility report

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::LedgeError;
use crate::{config, schema};

pub mod config_cmd;
pub mod simulate;
pub mod topology;

pub use config_cmd::{ConfigArgs, ConfigCommands};
pub use simulate::SimulateArgs;
pub use topology::TopologyArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledge CLI - auto-revealing edge dock engine.
#[derive(Parser, Debug)]
#[command(name = "ledge")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Replay a scenario file and print the dock signals.
    ///
    /// The scenario runs on an in-memory desktop with a virtual clock, so
    /// replays are instant and deterministic.
    Simulate(SimulateArgs),

    /// Show which monitors of a layout get a dock.
    ///
    /// A monitor only gets a dock when no other monitor sits directly
    /// below it.
    Topology(TopologyArgs),

    /// Show the resolved configuration or manage the configuration file.
    Config(ConfigArgs),

    /// Output Ledge configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Ledge configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(ledge completions --shell zsh)"
    ///   ledge completions --shell bash > ~/.local/share/bash-completion/completions/ledge
    ///   ledge completions --shell fish > ~/.config/fish/completions/ledge.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<std::path::PathBuf> {
        self.config.as_ref().map(std::path::PathBuf::from)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), LedgeError> {
        if let Some(path_buf) = self.config_path() {
            if !path_buf.exists() {
                return Err(LedgeError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path_buf.display()
                )));
            }
            config::set_custom_config_path(path_buf);
        }

        match &self.command {
            Commands::Simulate(args) => simulate::execute(args),
            Commands::Topology(args) => topology::execute(args),
            Commands::Config(args) => config_cmd::execute(args),

            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "ledge", &mut io::stdout());
    }
}
