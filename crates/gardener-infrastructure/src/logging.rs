//! Logging setup
//!
//! One `tracing-subscriber` registration for the whole process. Filter
//! precedence: `RUST_LOG`, then `GARDENER_LOG_LEVEL` via settings, then
//! `info`. `debug = true` wins over everything.

use gardener_domain::error::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are no-ops.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the signature stable for
/// file-logging extensions.
pub fn init(settings: &Settings) -> Result<()> {
    let filter = if settings.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(settings.log_level.as_deref().unwrap_or("info"))
        })
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    Ok(())
}
