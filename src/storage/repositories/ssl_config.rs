//! SSL configuration repository.
//!
//! Persists [`SslConfig`] records. Writes validate the full payload first,
//! then seal the key password through the secret codec; nothing reaches the
//! database when either step fails. Reads open the stored password and
//! tolerate records written by older code (unknown enum strings degrade to
//! defaults with a warning instead of failing the read).

use crate::domain::{RetryPolicy, SslConfig, SslConfigId, SslConfigInput, TlsProtocol, VerifyMode};
use crate::errors::{Result, TlsRegError};
use crate::secrets::SecretCodec;
use crate::storage::repositories::parse_timestamp;
use crate::storage::DbPool;
use crate::validation::validate_ssl_config;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

/// Raw database row for an SSL configuration
#[derive(Debug, sqlx::FromRow)]
struct SslConfigRow {
    id: String,
    name: String,
    ca_custom_certs: Option<String>,
    ca_allow_invalid_certs: i64,
    client_cert: Option<String>,
    client_key: Option<String>,
    client_key_pass: Option<String>,
    ssl_version: String,
    ssl_verify_mode: String,
    ssl_options: Option<String>,
    ssl_ciphers: Option<String>,
    https_retries: String,
    https_redirects: String,
    created_at: String,
    updated_at: String,
}

/// Convert a stored row into a domain record, opening the sealed password.
fn record_from_row(row: SslConfigRow, codec: &SecretCodec) -> SslConfig {
    let ssl_version = TlsProtocol::parse(&row.ssl_version).unwrap_or_else(|| {
        warn!(id = %row.id, value = %row.ssl_version, "Unknown stored ssl_version, using default");
        TlsProtocol::default()
    });

    let ssl_verify_mode = VerifyMode::parse(&row.ssl_verify_mode).unwrap_or_else(|| {
        warn!(id = %row.id, value = %row.ssl_verify_mode, "Unknown stored ssl_verify_mode, using default");
        VerifyMode::default()
    });

    let parse_retry = |field: &str, value: &str| {
        RetryPolicy::parse(value).unwrap_or_else(|| {
            warn!(id = %row.id, field, value, "Unparseable stored retry policy, using default");
            RetryPolicy::default()
        })
    };
    let https_retries = parse_retry("https_retries", &row.https_retries);
    let https_redirects = parse_retry("https_redirects", &row.https_redirects);

    let client_key_pass = row
        .client_key_pass
        .filter(|stored| !stored.is_empty())
        .map(|stored| codec.open(&stored).into_value());

    SslConfig {
        id: SslConfigId::from_string(row.id),
        name: row.name,
        ca_custom_certs: row.ca_custom_certs,
        ca_allow_invalid_certs: row.ca_allow_invalid_certs != 0,
        client_cert: row.client_cert,
        client_key: row.client_key,
        client_key_pass,
        ssl_version,
        ssl_verify_mode,
        ssl_options: row.ssl_options,
        ssl_ciphers: row.ssl_ciphers,
        https_retries,
        https_redirects,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

/// Storage interface for SSL configurations
#[async_trait]
pub trait SslConfigRepository: Send + Sync {
    async fn create(&self, input: SslConfigInput) -> Result<SslConfig>;
    async fn get_by_id(&self, id: &SslConfigId) -> Result<SslConfig>;
    async fn get_by_name(&self, name: &str) -> Result<SslConfig>;
    async fn list(&self) -> Result<Vec<SslConfig>>;
    async fn update(&self, id: &SslConfigId, input: SslConfigInput) -> Result<SslConfig>;
    async fn delete(&self, id: &SslConfigId) -> Result<()>;
}

/// SQLx-backed SSL configuration repository
#[derive(Clone, Debug)]
pub struct SqlxSslConfigRepository {
    pool: DbPool,
    codec: SecretCodec,
}

impl SqlxSslConfigRepository {
    pub fn new(pool: DbPool, codec: SecretCodec) -> Self {
        Self { pool, codec }
    }

    /// Validate and seal an input payload. Runs before any write so a
    /// rejected payload leaves the store untouched.
    fn prepare(&self, input: SslConfigInput) -> Result<(SslConfigInput, Option<String>)> {
        let input = input.normalized();
        validate_ssl_config(&input)?;

        let sealed_pass = match input.client_key_pass.as_deref() {
            Some(plaintext) => Some(self.codec.seal("client_key_pass", plaintext)?),
            None => None,
        };

        Ok((input, sealed_pass))
    }

    fn map_write_error(e: sqlx::Error, name: &str, context: &str) -> TlsRegError {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => TlsRegError::conflict(
                format!("SSL config with name '{}' already exists", name),
                "SslConfig",
            ),
            _ => TlsRegError::database(e, context.to_string()),
        }
    }
}

#[async_trait]
impl SslConfigRepository for SqlxSslConfigRepository {
    async fn create(&self, input: SslConfigInput) -> Result<SslConfig> {
        let (input, sealed_pass) = self.prepare(input)?;

        let id = SslConfigId::new();
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query_as::<_, SslConfigRow>(
            r#"
            INSERT INTO ssl_configs (
                id, name, ca_custom_certs, ca_allow_invalid_certs,
                client_cert, client_key, client_key_pass,
                ssl_version, ssl_verify_mode, ssl_options, ssl_ciphers,
                https_retries, https_redirects, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.ca_custom_certs)
        .bind(input.ca_allow_invalid_certs as i64)
        .bind(&input.client_cert)
        .bind(&input.client_key)
        .bind(&sealed_pass)
        .bind(input.ssl_version.as_str())
        .bind(input.ssl_verify_mode.as_str())
        .bind(&input.ssl_options)
        .bind(&input.ssl_ciphers)
        .bind(input.https_retries.to_string())
        .bind(input.https_redirects.to_string())
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &input.name, "Failed to create SSL config"))?;

        info!(id = %row.id, name = %row.name, "Created SSL config");
        Ok(record_from_row(row, &self.codec))
    }

    async fn get_by_id(&self, id: &SslConfigId) -> Result<SslConfig> {
        let row = sqlx::query_as::<_, SslConfigRow>("SELECT * FROM ssl_configs WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TlsRegError::database(e, "Failed to fetch SSL config by id"))?
            .ok_or_else(|| TlsRegError::not_found("SslConfig", id.as_str()))?;

        Ok(record_from_row(row, &self.codec))
    }

    async fn get_by_name(&self, name: &str) -> Result<SslConfig> {
        let row = sqlx::query_as::<_, SslConfigRow>("SELECT * FROM ssl_configs WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TlsRegError::database(e, "Failed to fetch SSL config by name"))?
            .ok_or_else(|| TlsRegError::not_found("SslConfig", name))?;

        Ok(record_from_row(row, &self.codec))
    }

    async fn list(&self) -> Result<Vec<SslConfig>> {
        let rows = sqlx::query_as::<_, SslConfigRow>("SELECT * FROM ssl_configs ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TlsRegError::database(e, "Failed to list SSL configs"))?;

        Ok(rows.into_iter().map(|row| record_from_row(row, &self.codec)).collect())
    }

    async fn update(&self, id: &SslConfigId, input: SslConfigInput) -> Result<SslConfig> {
        let (input, sealed_pass) = self.prepare(input)?;

        let now = Utc::now().to_rfc3339();

        let row = sqlx::query_as::<_, SslConfigRow>(
            r#"
            UPDATE ssl_configs SET
                name = $2,
                ca_custom_certs = $3,
                ca_allow_invalid_certs = $4,
                client_cert = $5,
                client_key = $6,
                client_key_pass = $7,
                ssl_version = $8,
                ssl_verify_mode = $9,
                ssl_options = $10,
                ssl_ciphers = $11,
                https_retries = $12,
                https_redirects = $13,
                updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.ca_custom_certs)
        .bind(input.ca_allow_invalid_certs as i64)
        .bind(&input.client_cert)
        .bind(&input.client_key)
        .bind(&sealed_pass)
        .bind(input.ssl_version.as_str())
        .bind(input.ssl_verify_mode.as_str())
        .bind(&input.ssl_options)
        .bind(&input.ssl_ciphers)
        .bind(input.https_retries.to_string())
        .bind(input.https_redirects.to_string())
        .bind(&now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &input.name, "Failed to update SSL config"))?
        .ok_or_else(|| TlsRegError::not_found("SslConfig", id.as_str()))?;

        info!(id = %row.id, name = %row.name, "Updated SSL config");
        Ok(record_from_row(row, &self.codec))
    }

    async fn delete(&self, id: &SslConfigId) -> Result<()> {
        let result = sqlx::query("DELETE FROM ssl_configs WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| TlsRegError::database(e, "Failed to delete SSL config"))?;

        if result.rows_affected() == 0 {
            return Err(TlsRegError::not_found("SslConfig", id.as_str()));
        }

        info!(id = %id, "Deleted SSL config");
        Ok(())
    }
}
