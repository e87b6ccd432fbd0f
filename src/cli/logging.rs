//! Diagnostic logging setup

use crate::runner::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `sitepipe=trace`
pub const LOG_ENV: &str = "SITEPIPE_LOG";

/// Default filter for a verbosity level when `SITEPIPE_LOG` is unset
pub fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Silent => "off",
        Verbosity::Quiet => "sitepipe=error",
        Verbosity::Normal => "sitepipe=warn",
        Verbosity::Verbose => "sitepipe=debug",
    }
}

/// Install the stderr subscriber; a second call is a no-op
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
