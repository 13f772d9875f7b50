//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the binary itself, the server library
/// and `tower_http` log at `default_level`.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let default_directives = format!(
        "{}={level},huddle_server={level},tower_http={level}",
        bin_name.replace('-', "_"),
        level = default_level,
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .try_init();
}
