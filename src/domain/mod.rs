//! Core domain types for the TLS registry.

pub mod id;
pub mod options;
pub mod ssl_config;

pub use id::SslConfigId;
pub use options::{
    split_options, DEFAULT_SSL_PROTOCOL, RUNTIME_SSL_OPTIONS, RUNTIME_SSL_PROTOCOLS,
    SUPPORTED_SSL_OPTIONS,
};
pub use ssl_config::{RetryPolicy, SslConfig, SslConfigInput, TlsProtocol, VerifyMode};
