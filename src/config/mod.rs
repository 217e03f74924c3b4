//! # Configuration Management
//!
//! Application configuration for the TLS registry, loaded from `TLSREG_*`
//! environment variables with sensible defaults.

use crate::errors::{Result, TlsRegError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Secret codec configuration
    pub secrets: SecretsConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            secrets: SecretsConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        })
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/tlsreg.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600, // 10 minutes
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a SQLite database URL
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            url: env_or("TLSREG_DATABASE_URL", defaults.url),
            max_connections: parse_env("TLSREG_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_env("TLSREG_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_seconds: parse_env(
                "TLSREG_DATABASE_CONNECT_TIMEOUT",
                defaults.connect_timeout_seconds,
            )?,
            idle_timeout_seconds: parse_env(
                "TLSREG_DATABASE_IDLE_TIMEOUT",
                defaults.idle_timeout_seconds,
            )?,
            auto_migrate: parse_env("TLSREG_DATABASE_AUTO_MIGRATE", defaults.auto_migrate)?,
        })
    }
}

/// Secret codec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Base64-encoded 32-byte master encryption key
    #[serde(skip_serializing)]
    pub master_key_base64: String,

    /// Reject encrypted values that would exceed the column capacity
    pub enforce_max_length: bool,
}

impl SecretsConfig {
    fn from_env() -> Result<Self> {
        let master_key_base64 = std::env::var("TLSREG_SECRET_KEY").map_err(|_| {
            TlsRegError::config(
                "TLSREG_SECRET_KEY environment variable not set. \
                 Generate a key with: openssl rand -base64 32",
            )
        })?;

        Ok(Self {
            master_key_base64,
            enforce_max_length: parse_env("TLSREG_ENFORCE_MAX_LENGTH", false)?,
        })
    }

    /// Fixed-key configuration for tests. Never use outside tests.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        use base64::Engine;
        Self {
            master_key_base64: base64::engine::general_purpose::STANDARD.encode([0x42u8; 32]),
            enforce_max_length: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default tracing filter directive (overridden by `RUST_LOG`)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

impl ObservabilityConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env_or("TLSREG_LOG_LEVEL", defaults.log_level),
            json_logs: parse_env("TLSREG_LOG_JSON", defaults.json_logs).unwrap_or(defaults.json_logs),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| TlsRegError::config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_defaults() {
        let config = DatabaseConfig::default();
        assert!(config.is_sqlite());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(600)));
        assert!(config.auto_migrate);
    }

    #[test]
    fn zero_idle_timeout_means_none() {
        let config = DatabaseConfig { idle_timeout_seconds: 0, ..Default::default() };
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn parse_env_falls_back_to_default() {
        std::env::remove_var("TLSREG_TEST_UNSET");
        assert_eq!(parse_env("TLSREG_TEST_UNSET", 7u32).unwrap(), 7);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        std::env::set_var("TLSREG_TEST_GARBAGE", "not-a-number");
        assert!(parse_env("TLSREG_TEST_GARBAGE", 7u32).is_err());
        std::env::remove_var("TLSREG_TEST_GARBAGE");
    }

    #[test]
    fn secrets_config_serialization_skips_key() {
        let config = SecretsConfig::for_testing();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("master_key_base64"));
    }
}
