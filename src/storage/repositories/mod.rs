//! Repository layer for registry persistence.
//!
//! Each repository owns the SQL for one table and converts rows into domain
//! types. Secret fields cross the codec here, at the storage boundary, so
//! domain records always carry plaintext.

pub mod hostname_mapping;
pub mod ssl_config;

pub use hostname_mapping::{HostnameMapping, HostnameMappingRepository, SqlxHostnameMappingRepository};
pub use ssl_config::{SslConfigRepository, SqlxSslConfigRepository};

use chrono::{DateTime, Utc};

/// Parse a stored timestamp, accepting RFC 3339 and the bare
/// `YYYY-MM-DD HH:MM:SS` form SQLite's CURRENT_TIMESTAMP produces.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .unwrap_or_else(|_| {
            tracing::warn!(raw, "Unparseable stored timestamp, substituting now");
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        let ts = parse_timestamp("2025-03-01T12:30:45+00:00");
        assert_eq!(ts.to_rfc3339(), "2025-03-01T12:30:45+00:00");
    }

    #[test]
    fn parses_sqlite_current_timestamp_format() {
        let ts = parse_timestamp("2025-03-01 12:30:45");
        assert_eq!(ts.timestamp(), 1740832245);
    }
}
