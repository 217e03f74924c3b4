//! # tlsreg
//!
//! Per-endpoint TLS configuration registry. Named SSL configurations are
//! validated, stored with encrypted key passwords, bound to normalized
//! `hostname[:port]` keys, and exported as flat client configs for the
//! transport layer.
//!
//! ## Architecture
//!
//! - **Domain**: configuration records and their value types
//! - **Validation**: field-keyed violation collection before any write
//! - **Secrets**: AES-256-GCM codec applied at the storage boundary
//! - **Storage**: SQLite persistence with filesystem migrations
//! - **Export**: flattening into the transport-layer wire contract
//! - **Services**: the [`TlsRegistry`] front door

pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod observability;
pub mod secrets;
pub mod services;
pub mod storage;
pub mod utils;
pub mod validation;

pub use config::AppConfig;
pub use domain::{RetryPolicy, SslConfig, SslConfigId, SslConfigInput, TlsProtocol, VerifyMode};
pub use errors::{Result, TlsRegError};
pub use export::TlsClientConfig;
pub use services::{Resolution, TlsRegistry};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "tlsreg";
