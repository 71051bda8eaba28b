//! Tracing initialization

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "FORECAST_COMPANION_LOG";

/// Install the fmt subscriber on stderr.
///
/// Reads `FORECAST_COMPANION_LOG` (for example
/// `FORECAST_COMPANION_LOG=forecast_companion::cache=debug`) and falls back to
/// `forecast_companion=info`. Safe to call more than once; a subscriber
/// installed elsewhere is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("forecast_companion=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
    });
}
