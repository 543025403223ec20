//! Tracing subscriber setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tradeport_domain::{LogFormat, LoggingConfig, Result, TradePortError};

/// Build the `EnvFilter` for a logging configuration
///
/// `RUST_LOG` wins over the configured directive when set.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.filter)
        .map_err(|e| TradePortError::Config(format!("Invalid log filter {:?}: {e}", config.filter)))
}

/// Install the global tracing subscriber
///
/// # Errors
/// Returns `TradePortError::Config` for an invalid filter, or
/// `TradePortError::Internal` if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_level(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true).with_level(true))
            .try_init(),
    };

    result.map_err(|e| TradePortError::Internal(format!("Failed to install tracing subscriber: {e}")))
}
