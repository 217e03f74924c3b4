//! # Error Types
//!
//! Error taxonomy for the TLS registry using `thiserror`.
//!
//! Validation failures are always surfaced to the caller for correction and
//! are never raised mid-write. Decryption failures are deliberately *not* an
//! error variant: the secret codec degrades the read and logs instead (see
//! `crate::secrets`).

use crate::validation::ConfigViolations;

/// Custom result type for registry operations
pub type Result<T> = std::result::Result<T, TlsRegError>;

/// Main error type for the TLS registry
#[derive(thiserror::Error, Debug)]
pub enum TlsRegError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Collected, field-keyed validation violations
    #[error("Validation error: {violations}")]
    Validation { violations: ConfigViolations },

    /// An encrypted value would exceed the column capacity of the store
    #[error(
        "Field {field} max_length={max_length} encrypted_len={encrypted_length}"
    )]
    StorageLimit {
        field: String,
        max_length: usize,
        encrypted_length: usize,
    },

    /// Encryption primitive failures (key setup, unencodable input)
    #[error("Crypto error: {message}")]
    Crypto { message: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Resource conflict errors (e.g., already exists)
    #[error("Resource conflict: {message}")]
    Conflict {
        message: String,
        resource_type: String,
    },
}

impl TlsRegError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a database error with context
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create a validation error from collected violations
    pub fn validation(violations: ConfigViolations) -> Self {
        Self::Validation { violations }
    }

    /// Create a validation error for a single field
    pub fn validation_field<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        let mut violations = ConfigViolations::new();
        violations.add(field, message);
        Self::Validation { violations }
    }

    /// Create a crypto error
    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto { message: message.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// Check if this error carries validation violations for the given field
    pub fn violates(&self, field: &str) -> bool {
        matches!(self, TlsRegError::Validation { violations } if violations.get(field).is_some())
    }
}

// Error conversions for common external error types
impl From<sqlx::Error> for TlsRegError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<std::io::Error> for TlsRegError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for TlsRegError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<ConfigViolations> for TlsRegError {
    fn from(violations: ConfigViolations) -> Self {
        Self::Validation { violations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = TlsRegError::config("Test configuration error");
        assert!(matches!(error, TlsRegError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_validation_field_error() {
        let error = TlsRegError::validation_field("client_key", "Client key must be defined if client cert is.");
        assert!(error.violates("client_key"));
        assert!(!error.violates("client_cert"));
    }

    #[test]
    fn test_storage_limit_message_names_field_and_length() {
        let error = TlsRegError::StorageLimit {
            field: "client_key_pass".to_string(),
            max_length: 255,
            encrypted_length: 312,
        };
        let msg = error.to_string();
        assert!(msg.contains("client_key_pass"));
        assert!(msg.contains("312"));
    }

    #[test]
    fn test_not_found_error() {
        let error = TlsRegError::not_found("SslConfig", "abc");
        assert_eq!(error.to_string(), "Resource not found: SslConfig with ID 'abc'");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: TlsRegError = io_error.into();
        assert!(matches!(error, TlsRegError::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: TlsRegError = json_error.into();
        assert!(matches!(error, TlsRegError::Serialization { .. }));
    }
}
