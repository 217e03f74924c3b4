//! Hostname binding repository.
//!
//! Maps a normalized `hostname[:port]` key to at most one SSL configuration.
//! Binding is an upsert keyed on the hostname, so rebinding a host is
//! last-writer-wins with a single stored row. Deleting a configuration nulls
//! out its bindings (enforced by the schema), leaving the host row behind as
//! an explicit "bound without config" marker.

use crate::domain::SslConfigId;
use crate::errors::{Result, TlsRegError};
use crate::storage::repositories::parse_timestamp;
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A hostname binding row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameMapping {
    /// Normalized lowercase `hostname[:port]` key.
    pub hostname_port: String,

    /// Bound configuration, `None` when the config was deleted out from
    /// under the binding.
    pub ssl_config_id: Option<SslConfigId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct HostnameMappingRow {
    hostname_port: String,
    ssl_config_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<HostnameMappingRow> for HostnameMapping {
    fn from(row: HostnameMappingRow) -> Self {
        Self {
            hostname_port: row.hostname_port,
            ssl_config_id: row.ssl_config_id.map(SslConfigId::from_string),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
        }
    }
}

/// Storage interface for hostname bindings
#[async_trait]
pub trait HostnameMappingRepository: Send + Sync {
    /// Bind a hostname key to a configuration (or to nothing). Rebinding an
    /// existing key overwrites the previous binding in place.
    async fn upsert(
        &self,
        hostname_port: &str,
        ssl_config_id: Option<&SslConfigId>,
    ) -> Result<HostnameMapping>;

    async fn resolve(&self, hostname_port: &str) -> Result<Option<HostnameMapping>>;
    async fn list(&self) -> Result<Vec<HostnameMapping>>;
    async fn delete(&self, hostname_port: &str) -> Result<()>;
}

/// SQLx-backed hostname binding repository
#[derive(Clone, Debug)]
pub struct SqlxHostnameMappingRepository {
    pool: DbPool,
}

impl SqlxHostnameMappingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostnameMappingRepository for SqlxHostnameMappingRepository {
    async fn upsert(
        &self,
        hostname_port: &str,
        ssl_config_id: Option<&SslConfigId>,
    ) -> Result<HostnameMapping> {
        if hostname_port.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(TlsRegError::validation_field(
                "hostname_port",
                "Hostname must be all lowercase.",
            ));
        }

        let now = Utc::now().to_rfc3339();

        let row = sqlx::query_as::<_, HostnameMappingRow>(
            r#"
            INSERT INTO hostname_mappings (hostname_port, ssl_config_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT(hostname_port) DO UPDATE SET
                ssl_config_id = excluded.ssl_config_id,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(hostname_port)
        .bind(ssl_config_id.map(SslConfigId::as_str))
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => TlsRegError::not_found(
                "SslConfig",
                ssl_config_id.map(SslConfigId::as_str).unwrap_or_default(),
            ),
            _ => TlsRegError::database(e, "Failed to upsert hostname binding".to_string()),
        })?;

        info!(
            hostname_port,
            ssl_config_id = ssl_config_id.map(SslConfigId::as_str),
            "Bound hostname"
        );
        Ok(row.into())
    }

    async fn resolve(&self, hostname_port: &str) -> Result<Option<HostnameMapping>> {
        let row = sqlx::query_as::<_, HostnameMappingRow>(
            "SELECT * FROM hostname_mappings WHERE hostname_port = $1",
        )
        .bind(hostname_port)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TlsRegError::database(e, "Failed to resolve hostname binding"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<HostnameMapping>> {
        let rows = sqlx::query_as::<_, HostnameMappingRow>(
            "SELECT * FROM hostname_mappings ORDER BY hostname_port",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TlsRegError::database(e, "Failed to list hostname bindings"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, hostname_port: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM hostname_mappings WHERE hostname_port = $1")
            .bind(hostname_port)
            .execute(&self.pool)
            .await
            .map_err(|e| TlsRegError::database(e, "Failed to delete hostname binding"))?;

        if result.rows_affected() == 0 {
            return Err(TlsRegError::not_found("HostnameMapping", hostname_port));
        }

        info!(hostname_port, "Deleted hostname binding");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, SecretsConfig};
    use crate::domain::SslConfigInput;
    use crate::secrets::SecretCodec;
    use crate::storage::create_pool;
    use crate::storage::repositories::{SqlxSslConfigRepository, SslConfigRepository};

    async fn repositories() -> (SqlxHostnameMappingRepository, SqlxSslConfigRepository) {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        let codec = SecretCodec::new(&SecretsConfig::for_testing()).unwrap();
        (
            SqlxHostnameMappingRepository::new(pool.clone()),
            SqlxSslConfigRepository::new(pool, codec),
        )
    }

    async fn make_config(configs: &SqlxSslConfigRepository, name: &str) -> SslConfigId {
        configs
            .create(SslConfigInput { name: name.to_string(), ..Default::default() })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn bind_resolve_roundtrip() {
        let (bindings, configs) = repositories().await;
        let id = make_config(&configs, "internal").await;

        bindings.upsert("api.example.com:8443", Some(&id)).await.unwrap();

        let resolved = bindings.resolve("api.example.com:8443").await.unwrap().unwrap();
        assert_eq!(resolved.ssl_config_id.as_ref(), Some(&id));
        assert!(bindings.resolve("other.example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rebinding_is_last_writer_wins_with_a_single_row() {
        let (bindings, configs) = repositories().await;
        let first = make_config(&configs, "first").await;
        let second = make_config(&configs, "second").await;

        bindings.upsert("api.example.com", Some(&first)).await.unwrap();
        bindings.upsert("api.example.com", Some(&second)).await.unwrap();

        let all = bindings.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].ssl_config_id.as_ref(), Some(&second));
    }

    #[tokio::test]
    async fn uppercase_key_is_rejected() {
        let (bindings, _) = repositories().await;

        let err = bindings.upsert("API.example.com", None).await.unwrap_err();
        assert!(err.violates("hostname_port"));
    }

    #[tokio::test]
    async fn binding_to_a_missing_config_is_not_found() {
        let (bindings, _) = repositories().await;
        let ghost = SslConfigId::new();

        let err = bindings.upsert("api.example.com", Some(&ghost)).await.unwrap_err();
        assert!(matches!(err, TlsRegError::NotFound { .. }));
    }

    #[tokio::test]
    async fn binding_without_config_is_allowed() {
        let (bindings, _) = repositories().await;

        let mapping = bindings.upsert("api.example.com", None).await.unwrap();
        assert!(mapping.ssl_config_id.is_none());
    }

    #[tokio::test]
    async fn deleting_config_nulls_bindings_but_keeps_the_row() {
        let (bindings, configs) = repositories().await;
        let id = make_config(&configs, "doomed").await;
        bindings.upsert("api.example.com", Some(&id)).await.unwrap();

        configs.delete(&id).await.unwrap();

        let resolved = bindings.resolve("api.example.com").await.unwrap().unwrap();
        assert!(resolved.ssl_config_id.is_none());
    }

    #[tokio::test]
    async fn delete_removes_binding() {
        let (bindings, _) = repositories().await;
        bindings.upsert("api.example.com", None).await.unwrap();

        bindings.delete("api.example.com").await.unwrap();
        assert!(bindings.resolve("api.example.com").await.unwrap().is_none());

        let err = bindings.delete("api.example.com").await.unwrap_err();
        assert!(matches!(err, TlsRegError::NotFound { .. }));
    }
}
