//! Logging setup for Lift hosts.
//!
//! Diagnostics go to stderr so command output on stdout stays parseable.
//! `LIFT_LOG` takes precedence over `RUST_LOG`; both accept `EnvFilter`
//! directives such as `lift_core::session=debug`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var checked before `RUST_LOG`
pub const LOG_ENV: &str = "LIFT_LOG";

/// Install the subscriber at WARN unless the environment says otherwise
pub fn init() {
    init_with_level("warn")
}

/// Install the subscriber with `default_level` as the fallback filter
///
/// Calling this twice is harmless; the second subscriber is not installed.
pub fn init_with_level(default_level: &str) {
    let installed = tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Debug-level logging captured by the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
