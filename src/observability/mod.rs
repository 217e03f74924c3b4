//! # Observability
//!
//! Structured logging setup using the tracing ecosystem. Spans and events
//! are emitted throughout the crate; this module only wires up the
//! subscriber.

use crate::config::ObservabilityConfig;
use crate::errors::{Result, TlsRegError};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured default directive.
/// Returns an error if a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            TlsRegError::config(format!("Invalid log filter '{}': {}", config.log_level, e))
        })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let init_result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    init_result
        .map_err(|e| TlsRegError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!(
        log_level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_directive_is_a_config_error() {
        let config = ObservabilityConfig {
            log_level: "not==a==filter".to_string(),
            json_logs: false,
        };
        // Skip when RUST_LOG is set; the env filter would win.
        if std::env::var("RUST_LOG").is_err() {
            assert!(init_logging(&config).is_err());
        }
    }
}
