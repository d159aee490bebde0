//! FieldSamp Core - domain logic for the sample-collection client
//!
//! This crate contains the timer state machine, data models, formatting,
//! caching, and configuration with zero HTTP or UI dependencies. It is
//! consumed by the REST client crate and the CLI binary.

pub mod cache;
pub mod clock;
pub mod config;
pub mod format;
pub mod logging;
pub mod models;
pub mod timer;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
