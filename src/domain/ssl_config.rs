//! The TLS configuration record and its value types.
//!
//! An [`SslConfig`] is the named, validated bundle of TLS parameters that a
//! hostname binding points at. In memory the record always carries the
//! *plaintext* private-key password; encryption happens at the storage
//! boundary (see `crate::secrets` and the SSL config repository).

use crate::domain::id::SslConfigId;
use crate::errors::TlsRegError;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum plaintext length of a client key password. Longer values may
/// exceed the 255 character column once encrypted.
pub const MAX_KEY_PASS_LEN: usize = 100;

/// Supported SSL/TLS protocol selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TlsProtocol {
    /// Negotiates any stable protocol version; preferred unless a specific
    /// version is required, combined with `ssl_options` to prune legacy ones.
    #[default]
    #[serde(rename = "PROTOCOL_SSLv23")]
    Sslv23,
    #[serde(rename = "PROTOCOL_SSLv3")]
    Sslv3,
    #[serde(rename = "PROTOCOL_TLSv1")]
    Tlsv1,
    #[serde(rename = "PROTOCOL_TLSv1_1")]
    Tlsv1_1,
    #[serde(rename = "PROTOCOL_TLSv1_2")]
    Tlsv1_2,
}

impl TlsProtocol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TlsProtocol::Sslv23 => "PROTOCOL_SSLv23",
            TlsProtocol::Sslv3 => "PROTOCOL_SSLv3",
            TlsProtocol::Tlsv1 => "PROTOCOL_TLSv1",
            TlsProtocol::Tlsv1_1 => "PROTOCOL_TLSv1_1",
            TlsProtocol::Tlsv1_2 => "PROTOCOL_TLSv1_2",
        }
    }

    /// Parse a stored protocol name, `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROTOCOL_SSLv23" => Some(TlsProtocol::Sslv23),
            "PROTOCOL_SSLv3" => Some(TlsProtocol::Sslv3),
            "PROTOCOL_TLSv1" => Some(TlsProtocol::Tlsv1),
            "PROTOCOL_TLSv1_1" => Some(TlsProtocol::Tlsv1_1),
            "PROTOCOL_TLSv1_2" => Some(TlsProtocol::Tlsv1_2),
            _ => None,
        }
    }
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TlsProtocol {
    type Err = TlsRegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            TlsRegError::validation_field("ssl_version", format!("Unknown SSL protocol: {}", s))
        })
    }
}

/// Peer certificate verification policy for the TLS handshake.
///
/// Anything other than [`VerifyMode::Required`] weakens verification and is
/// never applied as a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerifyMode {
    #[serde(rename = "CERT_NONE")]
    None,
    #[serde(rename = "CERT_OPTIONAL")]
    Optional,
    #[default]
    #[serde(rename = "CERT_REQUIRED")]
    Required,
}

impl VerifyMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VerifyMode::None => "CERT_NONE",
            VerifyMode::Optional => "CERT_OPTIONAL",
            VerifyMode::Required => "CERT_REQUIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CERT_NONE" => Some(VerifyMode::None),
            "CERT_OPTIONAL" => Some(VerifyMode::Optional),
            "CERT_REQUIRED" => Some(VerifyMode::Required),
            _ => None,
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerifyMode {
    type Err = TlsRegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            TlsRegError::validation_field("ssl_verify_mode", format!("Unknown verify mode: {}", s))
        })
    }
}

/// Retry/redirect policy for HTTPS requests.
///
/// `Count(0)` and [`RetryPolicy::DisabledSilently`] both perform zero
/// attempts, but `Count(0)` still raises on failure while the sentinel
/// suppresses the error. The canonical string forms are `"0"` and `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Perform up to `n` retries/redirects; failure is reported.
    Count(u32),
    /// Perform none and succeed silently on what would otherwise fail.
    DisabledSilently,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Count(3)
    }
}

impl RetryPolicy {
    /// Parse the canonical string form, `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "false" | "False" => Some(RetryPolicy::DisabledSilently),
            _ => s.parse::<u32>().ok().map(RetryPolicy::Count),
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryPolicy::Count(n) => write!(f, "{}", n),
            RetryPolicy::DisabledSilently => f.write_str("false"),
        }
    }
}

impl FromStr for RetryPolicy {
    type Err = TlsRegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            TlsRegError::validation_field(
                "https_retries",
                format!("Expected a non-negative count or 'false', got: {}", s),
            )
        })
    }
}

impl Serialize for RetryPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RetryPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RetryPolicy::parse(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid retry policy: {}", s)))
    }
}

/// A persisted, named TLS configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslConfig {
    pub id: SslConfigId,

    /// Display name of the configuration; unique across the registry.
    pub name: String,

    /// Filesystem path to a concatenated CA bundle in PEM format. System CAs
    /// are used when unset.
    pub ca_custom_certs: Option<String>,

    /// Allow invalid CAs during pre-validation of SSL components.
    pub ca_allow_invalid_certs: bool,

    /// Filesystem path to a client certificate in PEM format. Required if
    /// `client_key` is set.
    pub client_cert: Option<String>,

    /// Filesystem path to the client certificate's private key in PEM
    /// format. Required if `client_cert` is set.
    pub client_key: Option<String>,

    /// Client key password, plaintext in memory and encrypted at rest.
    /// Limited to [`MAX_KEY_PASS_LEN`] characters.
    pub client_key_pass: Option<String>,

    pub ssl_version: TlsProtocol,
    pub ssl_verify_mode: VerifyMode,

    /// Comma-separated list of `OP_*` option flags.
    pub ssl_options: Option<String>,

    /// OpenSSL cipher specification string.
    pub ssl_ciphers: Option<String>,

    pub https_retries: RetryPolicy,
    pub https_redirects: RetryPolicy,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or fully updating an [`SslConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfigInput {
    pub name: String,
    pub ca_custom_certs: Option<String>,
    pub ca_allow_invalid_certs: bool,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub client_key_pass: Option<String>,
    pub ssl_version: TlsProtocol,
    pub ssl_verify_mode: VerifyMode,
    pub ssl_options: Option<String>,
    pub ssl_ciphers: Option<String>,
    pub https_retries: RetryPolicy,
    pub https_redirects: RetryPolicy,
}

impl SslConfigInput {
    /// Collapse empty optional strings to `None` so that "unset" has a single
    /// representation throughout validation, storage, and export.
    pub fn normalized(mut self) -> Self {
        fn collapse(v: &mut Option<String>) {
            if v.as_deref().is_some_and(|s| s.is_empty()) {
                *v = None;
            }
        }
        collapse(&mut self.ca_custom_certs);
        collapse(&mut self.client_cert);
        collapse(&mut self.client_key);
        collapse(&mut self.client_key_pass);
        collapse(&mut self.ssl_options);
        collapse(&mut self.ssl_ciphers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_round_trips_canonical_names() {
        for name in ["PROTOCOL_SSLv23", "PROTOCOL_TLSv1_2"] {
            assert_eq!(TlsProtocol::parse(name).unwrap().as_str(), name);
        }
        assert!(TlsProtocol::parse("PROTOCOL_TLS").is_none());
    }

    #[test]
    fn default_protocol_and_verify_mode() {
        assert_eq!(TlsProtocol::default(), TlsProtocol::Sslv23);
        assert_eq!(VerifyMode::default(), VerifyMode::Required);
    }

    #[test]
    fn retry_policy_distinguishes_zero_from_sentinel() {
        let zero = RetryPolicy::parse("0").unwrap();
        let silent = RetryPolicy::parse("false").unwrap();
        assert_eq!(zero, RetryPolicy::Count(0));
        assert_eq!(silent, RetryPolicy::DisabledSilently);
        assert_ne!(zero, silent);
        assert_eq!(zero.to_string(), "0");
        assert_eq!(silent.to_string(), "false");
    }

    #[test]
    fn retry_policy_accepts_legacy_capitalized_sentinel() {
        assert_eq!(RetryPolicy::parse("False"), Some(RetryPolicy::DisabledSilently));
    }

    #[test]
    fn retry_policy_rejects_garbage() {
        assert!(RetryPolicy::parse("-1").is_none());
        assert!(RetryPolicy::parse("many").is_none());
    }

    #[test]
    fn retry_policy_serde_uses_canonical_strings() {
        let json = serde_json::to_string(&RetryPolicy::DisabledSilently).unwrap();
        assert_eq!(json, "\"false\"");
        let parsed: RetryPolicy = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(parsed, RetryPolicy::Count(5));
    }

    #[test]
    fn input_normalization_collapses_empty_strings() {
        let input = SslConfigInput {
            name: "test".to_string(),
            client_cert: Some(String::new()),
            ssl_options: Some(String::new()),
            client_key_pass: Some("secret".to_string()),
            ..Default::default()
        }
        .normalized();

        assert!(input.client_cert.is_none());
        assert!(input.ssl_options.is_none());
        assert_eq!(input.client_key_pass.as_deref(), Some("secret"));
    }

    #[test]
    fn input_deserializes_with_defaults() {
        let input: SslConfigInput = serde_json::from_str(r#"{"name":"default"}"#).unwrap();
        assert_eq!(input.ssl_version, TlsProtocol::Sslv23);
        assert_eq!(input.ssl_verify_mode, VerifyMode::Required);
        assert_eq!(input.https_retries, RetryPolicy::Count(3));
        assert!(!input.ca_allow_invalid_certs);
    }
}
