//! Domain ID types with the NewType pattern.
//!
//! Wrapping identifiers in their own type prevents ID mixing errors at
//! compile time while keeping full string compatibility with the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a [`crate::domain::SslConfig`] record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SslConfigId(String);

impl SslConfigId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an ID from an existing string (for database retrieval)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to inner string value
    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse and validate a UUID string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s)?;
        Ok(Self(s.to_string()))
    }
}

impl Default for SslConfigId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SslConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SslConfigId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SslConfigId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SslConfigId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<SslConfigId> for String {
    fn from(id: SslConfigId) -> Self {
        id.0
    }
}
