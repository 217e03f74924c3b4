//! # Error Handling
//!
//! Central error types for the TLS registry, built on `thiserror`.

mod types;

pub use types::{Result, TlsRegError};
