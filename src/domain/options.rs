//! Static allow-lists for TLS protocol and option constants.
//!
//! The registry deliberately does not introspect a TLS library at runtime for
//! its available `OP_*` / `PROTOCOL_*` constants. These lists are versioned
//! alongside the code and refreshed when the underlying TLS stack changes, so
//! a library upgrade cannot silently change validation behavior.
//!
//! Two lists exist for options: [`SUPPORTED_SSL_OPTIONS`] is what operators
//! may configure, [`RUNTIME_SSL_OPTIONS`] is what the running TLS stack
//! advertises. The runtime list is a superset; export filters against it.

/// Option flags accepted in an `ssl_options` configuration string.
pub const SUPPORTED_SSL_OPTIONS: &[&str] = &[
    "OP_ALL",
    "OP_CIPHER_SERVER_PREFERENCE",
    "OP_NO_COMPRESSION",
    "OP_NO_SSLv2",
    "OP_NO_SSLv3",
    "OP_NO_TLSv1",
    "OP_NO_TLSv1_1",
    "OP_NO_TLSv1_2",
    "OP_SINGLE_DH_USE",
    "OP_SINGLE_ECDH_USE",
];

/// Option flags the runtime TLS stack currently advertises.
///
/// Newer library builds expose flags the configuration allow-list does not
/// yet accept; keeping them here means previously stored configs survive a
/// library upgrade unchanged.
pub const RUNTIME_SSL_OPTIONS: &[&str] = &[
    "OP_ALL",
    "OP_CIPHER_SERVER_PREFERENCE",
    "OP_ENABLE_MIDDLEBOX_COMPAT",
    "OP_NO_COMPRESSION",
    "OP_NO_RENEGOTIATION",
    "OP_NO_SSLv2",
    "OP_NO_SSLv3",
    "OP_NO_TLSv1",
    "OP_NO_TLSv1_1",
    "OP_NO_TLSv1_2",
    "OP_NO_TLSv1_3",
    "OP_SINGLE_DH_USE",
    "OP_SINGLE_ECDH_USE",
];

/// Protocol names the runtime TLS stack still ships.
///
/// `PROTOCOL_SSLv3` stays configurable for legacy rows but modern library
/// builds have dropped it, so it is absent here and export substitutes the
/// default.
pub const RUNTIME_SSL_PROTOCOLS: &[&str] = &[
    "PROTOCOL_SSLv23",
    "PROTOCOL_TLSv1",
    "PROTOCOL_TLSv1_1",
    "PROTOCOL_TLSv1_2",
];

/// Default protocol substituted when a configured protocol has drifted out of
/// the runtime set.
pub const DEFAULT_SSL_PROTOCOL: &str = "PROTOCOL_SSLv23";

/// Split a comma/space separated option string into individual flag names.
///
/// Empty segments are dropped, so `"OP_ALL, ,OP_NO_SSLv2"` yields two flags.
pub fn split_options(raw: &str) -> Vec<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_options_are_a_subset_of_runtime_options() {
        for opt in SUPPORTED_SSL_OPTIONS {
            assert!(RUNTIME_SSL_OPTIONS.contains(opt), "{} missing from runtime set", opt);
        }
    }

    #[test]
    fn default_protocol_is_in_runtime_set() {
        assert!(RUNTIME_SSL_PROTOCOLS.contains(&DEFAULT_SSL_PROTOCOL));
    }

    #[test]
    fn split_options_handles_spaces_and_empties() {
        assert_eq!(
            split_options("OP_NO_SSLv2, OP_NO_SSLv3,OP_NO_COMPRESSION"),
            vec!["OP_NO_SSLv2", "OP_NO_SSLv3", "OP_NO_COMPRESSION"]
        );
        assert_eq!(split_options(" , "), Vec::<String>::new());
    }
}
