//! Topology CLI command.
//!
//! Shows which monitors of a layout get a dock.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::dock::Rect;
use crate::dock::geometry::has_monitor_below;
use crate::error::LedgeError;

/// Arguments of `ledge topology`.
#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// JSON file with a monitor list, or any object with a `monitors` field
    /// (scenario files work).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON.
    #[arg(long, short)]
    pub json: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Layout {
    List(Vec<Rect>),
    Object { monitors: Vec<Rect> },
}

impl Layout {
    fn into_monitors(self) -> Vec<Rect> {
        match self {
            Self::List(monitors) | Self::Object { monitors } => monitors,
        }
    }
}

/// Eligibility of one monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub index: usize,
    pub frame: Rect,
    pub has_monitor_below: bool,
    pub eligible: bool,
}

/// Computes the eligibility report of a monitor layout.
#[must_use]
pub fn report(monitors: &[Rect]) -> Vec<MonitorReport> {
    (0..monitors.len())
        .map(|index| {
            let below = has_monitor_below(monitors, index);
            MonitorReport {
                index,
                frame: monitors[index],
                has_monitor_below: below,
                eligible: !below,
            }
        })
        .collect()
}

/// Execute `ledge topology`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn execute(args: &TopologyArgs) -> Result<(), LedgeError> {
    let content = std::fs::read_to_string(&args.file)?;
    let layout: Layout = serde_json::from_str(&content)?;
    let reports = report(&layout.into_monitors());

    if args.json {
        let value = serde_json::to_value(&reports)?;
        output::print_highlighted_json(&value);
    } else {
        print_table(&reports);
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn print_table(reports: &[MonitorReport]) {
    #[derive(Tabled)]
    struct MonitorRow {
        #[tabled(rename = "Index")]
        index: usize,
        #[tabled(rename = "Resolution")]
        resolution: String,
        #[tabled(rename = "Position")]
        position: String,
        #[tabled(rename = "Monitor Below")]
        below: String,
        #[tabled(rename = "Dock")]
        dock: String,
    }

    if reports.is_empty() {
        println!("{}", "No monitors in layout.".dimmed());
        return;
    }

    let rows: Vec<MonitorRow> = reports
        .iter()
        .map(|r| MonitorRow {
            index: r.index,
            resolution: format!("{}x{}", r.frame.width as i64, r.frame.height as i64),
            position: format!("{}, {}", r.frame.x as i64, r.frame.y as i64),
            below: output::format_bool(r.has_monitor_below),
            dock: output::format_bool(r.eligible),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .with(Modify::new(Columns::new(3..5)).with(Alignment::center()))
        .to_string();

    let eligible = reports.iter().filter(|r| r.eligible).count();
    println!("{}", format!("Monitors ({}, {eligible} with dock)", reports.len()).bold());
    println!("{table}");
}
