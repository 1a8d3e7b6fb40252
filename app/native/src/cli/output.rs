//! CLI output formatting utilities.
//!
//! This module provides utilities for formatting CLI output including:
//! - JSON syntax highlighting
//! - Colored dock states and replay logs

use colored::Colorize;

use crate::dock::{DockSignal, OverlapStatus, PanelVisualState, Rect};
use crate::scenario::TimedSignal;

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
/// - Brackets/Braces: White (default)
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json_str = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    print_highlighted_json_str(&json_str);
}

/// Prints a JSON string with syntax highlighting.
fn print_highlighted_json_str(json: &str) {
    let mut in_string = false;
    let mut is_key = false;
    let mut escape_next = false;
    let mut current_token = String::new();
    let mut after_colon = false;

    for ch in json.chars() {
        if escape_next {
            current_token.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current_token.push(ch);
            escape_next = true;
            continue;
        }

        match ch {
            '"' => {
                if in_string {
                    // End of string
                    current_token.push(ch);
                    if is_key {
                        print!("{}", current_token.cyan());
                    } else {
                        print!("{}", current_token.green());
                    }
                    current_token.clear();
                    in_string = false;
                    is_key = false;
                } else {
                    // Start of string
                    flush_token(&mut current_token, after_colon);
                    current_token.push(ch);
                    in_string = true;
                    // It's a key if we're not after a colon
                    is_key = !after_colon;
                    after_colon = false;
                }
            }
            ':' if !in_string => {
                flush_token(&mut current_token, false);
                print!("{}", ":".white());
                after_colon = true;
            }
            ',' if !in_string => {
                flush_token(&mut current_token, after_colon);
                print!("{}", ",".white());
                after_colon = false;
            }
            '{' | '}' | '[' | ']' if !in_string => {
                flush_token(&mut current_token, after_colon);
                print!("{}", ch.to_string().white().bold());
                after_colon = false;
            }
            _ => {
                current_token.push(ch);
            }
        }
    }

    // Flush any remaining token
    flush_token(&mut current_token, after_colon);
    println!();
}

/// Flushes the current token with appropriate coloring.
fn flush_token(token: &mut String, is_value: bool) {
    if token.is_empty() {
        return;
    }

    let trimmed = token.trim();
    if trimmed.is_empty() {
        print!("{token}");
    } else if is_value {
        // Find the actual value position in the token
        let start = token.find(|c: char| !c.is_whitespace()).unwrap_or(0);
        let end = token.rfind(|c: char| !c.is_whitespace()).map_or(token.len(), |i| i + 1);

        let prefix = &token[..start];
        let value = &token[start..end];
        let suffix = &token[end..];

        // Check if it's a number, boolean, or null
        if value == "true" || value == "false" || value == "null" {
            print!("{}{}{}", prefix, value.magenta(), suffix);
        } else if value.parse::<f64>().is_ok() {
            print!("{}{}{}", prefix, value.yellow(), suffix);
        } else {
            print!("{token}");
        }
    } else {
        print!("{token}");
    }

    token.clear();
}

/// Formats a boolean as a colored string.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// Formats a rectangle as `x,y widthxheight`.
#[must_use]
pub fn format_rect(rect: Rect) -> String {
    format!("{},{} {}x{}", rect.x, rect.y, rect.width, rect.height)
}

/// Formats a visual state, green when the dock is on screen.
#[must_use]
pub fn format_visibility(state: PanelVisualState) -> String {
    let label = match state {
        PanelVisualState::Hidden => "hidden",
        PanelVisualState::Revealing => "revealing",
        PanelVisualState::Shown => "shown",
        PanelVisualState::Hiding => "hiding",
    };
    if state.is_visible() {
        label.green().to_string()
    } else {
        label.dimmed().to_string()
    }
}

/// Formats an overlap status.
#[must_use]
pub fn format_status(status: OverlapStatus) -> String {
    match status {
        OverlapStatus::Unknown => "unknown".dimmed().to_string(),
        OverlapStatus::NoOverlap => "clear".green().to_string(),
        OverlapStatus::Overlapping => "overlapping".yellow().to_string(),
    }
}

/// Formats one line of a replay log.
#[must_use]
pub fn format_signal(timed: &TimedSignal) -> String {
    let time = format!("{:>7} ms", timed.at_ms).dimmed();
    let detail = match timed.signal {
        DockSignal::TargetBoxUpdated { monitor, target_box } => format!(
            "{} monitor {monitor} {}",
            "target-box".cyan(),
            format_rect(target_box)
        ),
        DockSignal::StatusChanged { monitor, status } => {
            format!("{} monitor {monitor} {}", "status".cyan(), format_status(status))
        }
        DockSignal::Triggered { monitor } => {
            format!("{} monitor {monitor}", "triggered".magenta().bold())
        }
        DockSignal::VisibilityChanged { monitor, state } => {
            format!("{} monitor {monitor} {}", "visibility".cyan(), format_visibility(state))
        }
    };
    format!("{time}  {detail}")
}
