//! CLI module for Ledge.
//!
//! The CLI replays scenarios on the in-memory host, reports monitor
//! eligibility and manages the configuration file.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::LedgeError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), LedgeError> {
    let cli = Cli::parse();
    cli.execute()
}
