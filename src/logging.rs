//! Structured logging setup for the server binary.
//!
//! Filters come from the `RANKBOARD_LOG` environment variable:
//!
//! - `RANKBOARD_LOG=info` - default
//! - `RANKBOARD_LOG=rankboard::ranking=debug` - per-resolver detail
//! - `RANKBOARD_LOG=warn,rankboard::http=debug` - combined filters

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "RANKBOARD_LOG";

/// Install the global subscriber with an `info` default.
///
/// Later calls are ignored; tracing only allows one global subscriber.
pub fn init() {
    init_with_default("info");
}

pub fn init_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init();
}

/// JSON lines output for log aggregators.
pub fn init_json() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_target(true).json().try_init();
}
