//! Ledge - an auto-revealing bottom-edge dock engine.
//!
//! The dock stays out of the way while the focused window covers its area
//! (intellihide), and comes back when the pointer pushes against the bottom
//! edge of the screen (pressure barrier reveal).
//!
//! - [`dock`] is the single-threaded engine, generic over the host it runs in.
//! - [`runtime`] wraps the engine in a tokio actor.
//! - [`scenario`] replays scripted desktop activity on the in-memory host.
//! - [`cli`] is the `ledge` command line.

// Core modules
pub mod config;
pub mod constants;
pub mod dock;
pub mod error;
pub mod runtime;
pub mod scenario;
pub mod schema;

// Command line
pub mod cli;
