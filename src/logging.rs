//! Logging setup.
//!
//! `RUST_LOG` controls verbosity (default `info`), e.g. `RUST_LOG=parcel_importer=debug`.
//! Logs go to stderr so stdout carries only the run summary.

use tracing_subscriber::{EnvFilter, fmt};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // `try_init` so a second call (tests, embedding) is a no-op instead of a panic.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
