//! Logging setup for the MCP tool server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Directive used when neither `RUST_LOG` nor the config yields a valid filter
const FALLBACK_DIRECTIVE: &str = "info";

/// Level to log at, `debug` when verbose output was requested
pub fn effective_level(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        &config.level
    }
}

/// Initialize logging with the specified configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(effective_level(config, verbose)))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE));

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Compact => subscriber
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .try_init(),
    };

    result.map_err(|e| crate::ServerError::Config(format!("Failed to initialize logging: {}", e)))
}
