//! # Config Exporter
//!
//! Flattens a validated [`SslConfig`] into the plain structure consumed by a
//! TLS client. The field names and semantics of [`TlsClientConfig`] are the
//! stable wire contract to the transport layer.
//!
//! Export is pure and side-effect free. It is also a trust boundary: the
//! output carries the plaintext key password for immediate use and must never
//! be persisted or logged (its `Debug` impl redacts the password).

use crate::domain::options::{
    split_options, DEFAULT_SSL_PROTOCOL, RUNTIME_SSL_OPTIONS, RUNTIME_SSL_PROTOCOLS,
};
use crate::domain::SslConfig;
use serde::Serialize;
use tracing::warn;

/// Flat TLS configuration handed to the transport layer.
#[derive(Clone, PartialEq, Serialize)]
pub struct TlsClientConfig {
    pub name: String,
    pub ca_custom_certs: Option<String>,
    pub ca_allow_invalid_certs: bool,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    /// Plaintext password, decrypted for immediate use.
    pub client_key_pass: Option<String>,
    pub ssl_version: String,
    pub ssl_verify_mode: String,
    /// Configured flags filtered to what the runtime TLS stack advertises;
    /// `Some(vec![])` when options were configured but none survive,
    /// `None` only when no options were ever configured.
    pub ssl_options: Option<Vec<String>>,
    pub ssl_ciphers: Option<String>,
    /// Canonical retry count, or `"false"` for disabled-without-error.
    pub https_retries: String,
    pub https_redirects: String,
}

impl std::fmt::Debug for TlsClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsClientConfig")
            .field("name", &self.name)
            .field("ca_custom_certs", &self.ca_custom_certs)
            .field("ca_allow_invalid_certs", &self.ca_allow_invalid_certs)
            .field("client_cert", &self.client_cert)
            .field("client_key", &self.client_key)
            .field("client_key_pass", &self.client_key_pass.as_ref().map(|_| "[REDACTED]"))
            .field("ssl_version", &self.ssl_version)
            .field("ssl_verify_mode", &self.ssl_verify_mode)
            .field("ssl_options", &self.ssl_options)
            .field("ssl_ciphers", &self.ssl_ciphers)
            .field("https_retries", &self.https_retries)
            .field("https_redirects", &self.https_redirects)
            .finish()
    }
}

/// Flatten a record into the transport-layer configuration.
pub fn export(config: &SslConfig) -> TlsClientConfig {
    TlsClientConfig {
        name: config.name.clone(),
        ca_custom_certs: config.ca_custom_certs.clone(),
        ca_allow_invalid_certs: config.ca_allow_invalid_certs,
        client_cert: config.client_cert.clone(),
        client_key: config.client_key.clone(),
        client_key_pass: config.client_key_pass.clone(),
        ssl_version: runtime_protocol(config),
        ssl_verify_mode: config.ssl_verify_mode.as_str().to_string(),
        ssl_options: runtime_options(config),
        ssl_ciphers: config.ssl_ciphers.clone(),
        https_retries: config.https_retries.to_string(),
        https_redirects: config.https_redirects.to_string(),
    }
}

impl SslConfig {
    /// Convenience wrapper over [`export`].
    pub fn to_client_config(&self) -> TlsClientConfig {
        export(self)
    }
}

/// Emit the configured protocol when the runtime stack still ships it,
/// otherwise fall back to the default. Configuration drift after a TLS
/// library upgrade degrades the connection settings instead of failing it.
fn runtime_protocol(config: &SslConfig) -> String {
    let configured = config.ssl_version.as_str();
    if RUNTIME_SSL_PROTOCOLS.contains(&configured) {
        configured.to_string()
    } else {
        warn!(
            config = %config.name,
            configured,
            fallback = DEFAULT_SSL_PROTOCOL,
            "Configured SSL protocol not in runtime set; substituting default"
        );
        DEFAULT_SSL_PROTOCOL.to_string()
    }
}

/// Filter configured flags to those the runtime stack advertises. Dropped
/// flags are silent; the emitted set is always a subset of what is
/// configured.
fn runtime_options(config: &SslConfig) -> Option<Vec<String>> {
    config.ssl_options.as_deref().map(|raw| {
        split_options(raw)
            .into_iter()
            .filter(|opt| RUNTIME_SSL_OPTIONS.contains(&opt.as_str()))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RetryPolicy, SslConfigId, TlsProtocol, VerifyMode};
    use chrono::Utc;

    fn record() -> SslConfig {
        SslConfig {
            id: SslConfigId::new(),
            name: "Endpoint defaults".to_string(),
            ca_custom_certs: None,
            ca_allow_invalid_certs: false,
            client_cert: None,
            client_key: None,
            client_key_pass: None,
            ssl_version: TlsProtocol::Sslv23,
            ssl_verify_mode: VerifyMode::Required,
            ssl_options: None,
            ssl_ciphers: None,
            https_retries: RetryPolicy::Count(3),
            https_redirects: RetryPolicy::Count(3),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unset_optionals_are_absent_not_empty() {
        let exported = export(&record());
        assert_eq!(exported.ca_custom_certs, None);
        assert_eq!(exported.client_cert, None);
        assert_eq!(exported.client_key, None);
        assert_eq!(exported.ssl_ciphers, None);
        assert_eq!(exported.ssl_options, None);
    }

    #[test]
    fn supported_protocol_is_emitted_verbatim() {
        let mut config = record();
        config.ssl_version = TlsProtocol::Tlsv1_2;
        assert_eq!(export(&config).ssl_version, "PROTOCOL_TLSv1_2");
    }

    #[test]
    fn dropped_runtime_protocol_falls_back_to_default() {
        let mut config = record();
        config.ssl_version = TlsProtocol::Sslv3;
        assert_eq!(export(&config).ssl_version, DEFAULT_SSL_PROTOCOL);
    }

    #[test]
    fn configured_options_round_trip_when_supported() {
        let mut config = record();
        config.ssl_options = Some("OP_NO_SSLv2, OP_NO_SSLv3, OP_NO_COMPRESSION".to_string());
        assert_eq!(
            export(&config).ssl_options,
            Some(vec![
                "OP_NO_SSLv2".to_string(),
                "OP_NO_SSLv3".to_string(),
                "OP_NO_COMPRESSION".to_string()
            ])
        );
    }

    #[test]
    fn unknown_option_is_silently_dropped() {
        let mut config = record();
        config.ssl_options = Some("OP_NO_SSLv2, OP_BOGUS".to_string());
        assert_eq!(export(&config).ssl_options, Some(vec!["OP_NO_SSLv2".to_string()]));
    }

    #[test]
    fn options_become_empty_set_not_absent_when_all_dropped() {
        let mut config = record();
        config.ssl_options = Some("OP_BOGUS".to_string());
        assert_eq!(export(&config).ssl_options, Some(vec![]));
    }

    #[test]
    fn verify_mode_is_emitted_verbatim() {
        let mut config = record();
        config.ssl_verify_mode = VerifyMode::Optional;
        assert_eq!(export(&config).ssl_verify_mode, "CERT_OPTIONAL");
    }

    #[test]
    fn retry_sentinel_survives_export_distinct_from_zero() {
        let mut config = record();
        config.https_retries = RetryPolicy::Count(0);
        config.https_redirects = RetryPolicy::DisabledSilently;

        let exported = export(&config);
        assert_eq!(exported.https_retries, "0");
        assert_eq!(exported.https_redirects, "false");
    }

    #[test]
    fn plaintext_password_is_carried_but_debug_redacted() {
        let mut config = record();
        config.client_key_pass = Some("hunter2".to_string());

        let exported = export(&config);
        assert_eq!(exported.client_key_pass.as_deref(), Some("hunter2"));

        let debug = format!("{:?}", exported);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn wire_contract_field_names_are_stable() {
        let exported = export(&record());
        let json = serde_json::to_value(&exported).unwrap();
        for field in [
            "name",
            "ca_custom_certs",
            "ca_allow_invalid_certs",
            "client_cert",
            "client_key",
            "client_key_pass",
            "ssl_version",
            "ssl_verify_mode",
            "ssl_options",
            "ssl_ciphers",
            "https_retries",
            "https_redirects",
        ] {
            assert!(json.get(field).is_some(), "missing wire field {}", field);
        }
    }
}
