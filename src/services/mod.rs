//! Service layer orchestrating repositories, codec, and export.

pub mod tls_registry;

pub use tls_registry::{Resolution, TlsRegistry};
