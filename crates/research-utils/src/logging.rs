//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Initialize tracing subscriber with the `info` default filter
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing subscriber, falling back to `default_directive` when
/// `RUST_LOG` is unset or invalid
///
/// Logs go to stderr so they never mix with console output. Setting
/// `LOG_FORMAT=json` switches to one JSON object per event.
///
/// Calling this more than once is harmless: later calls are ignored.
pub fn init_tracing_with_default(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json_requested(std::env::var(LOG_FORMAT_VAR).ok().as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}
