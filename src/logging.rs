//! Logging initialization.
//!
//! Filter directives come from the `PICTRIKIT_LOG` environment variable and
//! fall back to the configured level.
//!
//! ```bash
//! PICTRIKIT_LOG=debug pictrikit compose --layout grid-2x2 a.png b.png
//! PICTRIKIT_LOG=pictrikit::export=trace,warn pictrikit compose ...
//! ```

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

pub const LOG_ENV_VAR: &str = "PICTRIKIT_LOG";

/// Filter from `PICTRIKIT_LOG`, or `fallback` when unset or invalid.
pub fn filter(fallback: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback.as_str()))
}

/// Installs the global subscriber, writing to stderr so stdout stays free
/// for command output.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
pub fn init(fallback: LogLevel) {
    fmt()
        .with_env_filter(filter(fallback))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
