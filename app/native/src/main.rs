#![allow(clippy::multiple_crate_versions)]

//! Ledge - auto-revealing edge dock engine.
//!
//! This binary is the command-line front end: scenario replay, topology
//! reports, configuration and shell completions.

use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "ledge=info,ledge_lib=info";

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(err) = ledge_lib::cli::run() {
        eprintln!("ledge: {err}");
        std::process::exit(1);
    }
}
