//! Hostname normalization for binding keys.
//!
//! A binding key is the lowercase `hostname` or `hostname:port` extracted
//! from a request target. Two targets that differ only in scheme casing,
//! host casing, path, or query normalize to the same key.

use crate::errors::{Result, TlsRegError};
use url::Url;

/// Extract the normalized `hostname[:port]` key from a URL.
///
/// Scheme-less inputs such as `example.com:8443` are accepted. Ports that
/// are the scheme default (e.g. `:443` for `https`) are dropped by URL
/// normalization, so keys stay canonical.
pub fn host_key(raw: &str) -> Result<String> {
    let parsed = parse_lenient(raw)?;

    let host = parsed
        .host_str()
        .ok_or_else(|| TlsRegError::validation_field("hostname_port", no_host_message(raw)))?;

    let host = host.to_ascii_lowercase();
    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Parse a URL, assuming an `https` scheme for bare `host[:port]` inputs.
fn parse_lenient(raw: &str) -> Result<Url> {
    let candidate = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{}", raw))
    };

    candidate.map_err(|e| {
        TlsRegError::validation_field("hostname_port", format!("{}: {}", no_host_message(raw), e))
    })
}

fn no_host_message(raw: &str) -> String {
    format!("Could not extract a hostname from: {}", raw)
}
