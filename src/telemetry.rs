//! Logging setup.
//!
//! `RUST_LOG` takes precedence over the configured `server.log_level`.
//! Production emits JSON lines; other environments use the human-readable
//! formatter.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter, Layer,
    Registry,
};

use crate::config::ServerConfig;

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(server: &ServerConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let fmt_layer = if server.is_production() {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_line_number(true).boxed()
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}
