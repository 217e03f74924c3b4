//! Shared helpers.

pub mod hostname;

pub use hostname::host_key;
