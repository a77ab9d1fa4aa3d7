//! Logging setup for the `chash` command.
//!
//! Logs go to stderr so command output on stdout stays clean for piping.

use tracing_subscriber::EnvFilter;

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` if set, otherwise uses `level`. Call once, before any
/// `tracing` events are emitted.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
