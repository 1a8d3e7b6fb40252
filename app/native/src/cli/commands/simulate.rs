//! Simulate CLI command.
//!
//! Replays a scenario file on the in-memory host and prints what the docks
//! did.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config;
use crate::error::LedgeError;
use crate::runtime::DockState;
use crate::scenario::{self, Scenario};

/// Arguments of `ledge simulate`.
#[derive(Args, Debug)]
#[command(after_long_help = r#"Examples:
  ledge simulate scenario.json             # Print signals as they happen
  ledge simulate scenario.json --json      # Full replay as JSON
  ledge simulate scenario.json --monitor 1 # Only signals of monitor 1"#)]
pub struct SimulateArgs {
    /// Scenario file (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output the replay as JSON.
    #[arg(long, short)]
    pub json: bool,

    /// Only show signals of this monitor.
    #[arg(long, short, value_name = "INDEX")]
    pub monitor: Option<usize>,
}

/// Execute `ledge simulate`.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or refers to windows or
/// monitors that do not exist.
pub fn execute(args: &SimulateArgs) -> Result<(), LedgeError> {
    let scenario = Scenario::from_path(&args.file)?;
    let mut replay = scenario::replay(&scenario, config::get_config())?;

    if let Some(monitor) = args.monitor {
        replay.signals.retain(|s| s.signal.monitor() == monitor);
        replay.docks.retain(|d| d.monitor == monitor);
    }

    if args.json {
        let value = serde_json::to_value(&replay)?;
        output::print_highlighted_json(&value);
        return Ok(());
    }

    for signal in &replay.signals {
        println!("{}", output::format_signal(signal));
    }
    println!();
    print_docks(&replay.docks, replay.ended_at_ms);
    Ok(())
}

fn print_docks(docks: &[DockState], ended_at_ms: u64) {
    #[derive(Tabled)]
    struct DockRow {
        #[tabled(rename = "Monitor")]
        monitor: usize,
        #[tabled(rename = "Visibility")]
        visibility: String,
        #[tabled(rename = "Overlap")]
        overlap: String,
        #[tabled(rename = "Held Open")]
        held_open: String,
        #[tabled(rename = "Target Box")]
        target_box: String,
    }

    if docks.is_empty() {
        println!("{}", "No docks.".dimmed());
        return;
    }

    let rows: Vec<DockRow> = docks
        .iter()
        .map(|d| DockRow {
            monitor: d.monitor,
            visibility: output::format_visibility(d.visibility),
            overlap: output::format_status(d.overlap),
            held_open: output::format_bool(d.flags.any()),
            target_box: d.target_box.map_or_else(|| "-".to_string(), output::format_rect),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", format!("Docks at {ended_at_ms} ms").bold());
    println!("{table}");
}
