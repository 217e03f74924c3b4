//! # Configuration Validation
//!
//! Pre-write validation for TLS configuration records. All rule failures are
//! collected into a field-keyed [`ConfigViolations`] map and returned
//! together; validation never fails fast and never mutates state, so it is
//! safe to run concurrently and must pass before any create/update commits.
//!
//! File-readability rules stat local disk only (no network). Callers on
//! latency-sensitive paths should wrap validation with their own deadline.

use crate::domain::options::{split_options, SUPPORTED_SSL_OPTIONS};
use crate::domain::ssl_config::{SslConfigInput, MAX_KEY_PASS_LEN};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use validator::ValidationError;

/// Ordered mapping from field name to a human-readable violation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigViolations(BTreeMap<String, String>);

impl ConfigViolations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert into `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ConfigViolations> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ConfigViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Validate a candidate TLS configuration record.
///
/// Returns every violation at once, keyed by field name. The input is
/// expected to be [normalized](SslConfigInput::normalized) so that "unset"
/// is always `None`.
pub fn validate_ssl_config(input: &SslConfigInput) -> Result<(), ConfigViolations> {
    let mut violations = ConfigViolations::new();

    collect(&mut violations, "name", validate_name(&input.name));

    if let Some(opts) = input.ssl_options.as_deref() {
        collect(&mut violations, "ssl_options", validate_ssl_options(opts));
    }

    // PKI components must be present and readable before a connection is
    // ever attempted with them.
    for (field, path) in [
        ("ca_custom_certs", input.ca_custom_certs.as_deref()),
        ("client_cert", input.client_cert.as_deref()),
        ("client_key", input.client_key.as_deref()),
    ] {
        if let Some(path) = path {
            collect(&mut violations, field, validate_readable_file(path));
        }
    }

    if input.client_cert.is_some() && input.client_key.is_none() {
        violations.add("client_key", "Client key must be defined if client cert is.");
    }
    if input.client_key.is_some() && input.client_cert.is_none() {
        violations.add("client_cert", "Client cert must be defined if client key is.");
    }

    if let Some(pass) = input.client_key_pass.as_deref() {
        collect(&mut violations, "client_key_pass", validate_key_pass(pass));
    }

    violations.into_result()
}

fn collect(
    violations: &mut ConfigViolations,
    field: &str,
    result: Result<(), ValidationError>,
) {
    if let Err(err) = result {
        let message = err
            .message
            .map(|m| m.into_owned())
            .unwrap_or_else(|| err.code.into_owned());
        violations.add(field, message);
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_required");
        err.message = Some("Name is required.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_ssl_options(raw: &str) -> Result<(), ValidationError> {
    let invalid: Vec<String> = split_options(raw)
        .into_iter()
        .filter(|opt| !SUPPORTED_SSL_OPTIONS.contains(&opt.as_str()))
        .collect();

    if invalid.is_empty() {
        return Ok(());
    }

    let mut err = ValidationError::new("unsupported_ssl_options");
    err.message = Some(
        format!(
            "Options {} not in supported SSL options: [{}]",
            invalid.join(", "),
            SUPPORTED_SSL_OPTIONS.join(",")
        )
        .into(),
    );
    Err(err)
}

/// A configured PKI path must exist, be a regular file, and be readable by
/// the process.
fn validate_readable_file(path: &str) -> Result<(), ValidationError> {
    if file_readable(path) {
        return Ok(());
    }
    let mut err = ValidationError::new("file_not_readable");
    err.message = Some(format!("File does not exist or not readable at: {}", path).into());
    Err(err)
}

fn validate_key_pass(pass: &str) -> Result<(), ValidationError> {
    if pass.chars().count() > MAX_KEY_PASS_LEN {
        let mut err = ValidationError::new("key_pass_too_long");
        err.message = Some(
            format!("Client key password limited to {} characters.", MAX_KEY_PASS_LEN).into(),
        );
        return Err(err);
    }
    Ok(())
}

fn file_readable(path: &str) -> bool {
    let path = Path::new(path);
    path.is_file() && fs::File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_input() -> SslConfigInput {
        SslConfigInput { name: "Test config".to_string(), ..Default::default() }
    }

    #[test]
    fn minimal_named_config_is_valid() {
        assert!(validate_ssl_config(&base_input()).is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let input = SslConfigInput { name: "  ".to_string(), ..Default::default() };
        let violations = validate_ssl_config(&input).unwrap_err();
        assert_eq!(violations.get("name"), Some("Name is required."));
    }

    #[test]
    fn unknown_option_flag_is_listed_by_name() {
        let input = SslConfigInput {
            ssl_options: Some("OP_NO_SSLv2, OP_BOGUS".to_string()),
            ..base_input()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        let msg = violations.get("ssl_options").unwrap();
        assert!(msg.contains("OP_BOGUS"));
        assert!(!msg.starts_with("Options OP_NO_SSLv2"));
    }

    #[test]
    fn known_option_flags_pass() {
        let input = SslConfigInput {
            ssl_options: Some("OP_NO_SSLv2,OP_NO_SSLv3, OP_NO_COMPRESSION".to_string()),
            ..base_input()
        };
        assert!(validate_ssl_config(&input).is_ok());
    }

    #[test]
    fn missing_file_is_a_violation() {
        let input = SslConfigInput {
            ca_custom_certs: Some("/nonexistent/ca.pem".to_string()),
            ..base_input()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        assert_eq!(
            violations.get("ca_custom_certs"),
            Some("File does not exist or not readable at: /nonexistent/ca.pem")
        );
    }

    #[test]
    fn readable_file_passes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-----BEGIN CERTIFICATE-----").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let input = SslConfigInput { ca_custom_certs: Some(path), ..base_input() };
        assert!(validate_ssl_config(&input).is_ok());
    }

    #[test]
    fn directory_is_not_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = SslConfigInput {
            ca_custom_certs: Some(dir.path().to_str().unwrap().to_string()),
            ..base_input()
        };
        assert!(validate_ssl_config(&input).is_err());
    }

    #[test]
    fn cert_without_key_yields_exactly_one_violation() {
        let cert = tempfile::NamedTempFile::new().unwrap();
        let input = SslConfigInput {
            client_cert: Some(cert.path().to_str().unwrap().to_string()),
            ..base_input()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations.get("client_key"),
            Some("Client key must be defined if client cert is.")
        );
    }

    #[test]
    fn key_without_cert_yields_distinct_message() {
        let key = tempfile::NamedTempFile::new().unwrap();
        let input = SslConfigInput {
            client_key: Some(key.path().to_str().unwrap().to_string()),
            ..base_input()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        assert_eq!(
            violations.get("client_cert"),
            Some("Client cert must be defined if client key is.")
        );
    }

    #[test]
    fn overlong_key_pass_is_rejected() {
        let input = SslConfigInput {
            client_key_pass: Some("x".repeat(MAX_KEY_PASS_LEN + 1)),
            ..base_input()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        assert_eq!(
            violations.get("client_key_pass"),
            Some("Client key password limited to 100 characters.")
        );
    }

    #[test]
    fn boundary_length_key_pass_is_accepted() {
        let input = SslConfigInput {
            client_key_pass: Some("x".repeat(MAX_KEY_PASS_LEN)),
            ..base_input()
        };
        assert!(validate_ssl_config(&input).is_ok());
    }

    #[test]
    fn violations_are_collected_not_fail_fast() {
        let input = SslConfigInput {
            name: String::new(),
            ssl_options: Some("OP_BOGUS".to_string()),
            client_cert: Some("/nonexistent/cert.pem".to_string()),
            client_key_pass: Some("x".repeat(200)),
            ..Default::default()
        };
        let violations = validate_ssl_config(&input).unwrap_err();
        // name, ssl_options, client_cert (unreadable), client_key (pairing),
        // client_key_pass
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn violations_display_is_field_keyed() {
        let mut violations = ConfigViolations::new();
        violations.add("name", "Name is required.");
        assert_eq!(violations.to_string(), "name: Name is required.");
    }
}
