//! # Storage and Persistence
//!
//! Database connectivity and persistence layer for registry data.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    get_migration_version, list_applied_migrations, validate_migrations, MigrationInfo,
};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{
    HostnameMapping, HostnameMappingRepository, SqlxHostnameMappingRepository,
    SqlxSslConfigRepository, SslConfigRepository,
};

use crate::errors::{Result, TlsRegError};

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| TlsRegError::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            auto_migrate: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_connectivity_check() {
        let pool = create_pool(&memory_config()).await.unwrap();
        check_connection(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool(&memory_config()).await.unwrap();

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert!(validate_migrations(&pool).await.unwrap());
        assert!(get_migration_version(&pool).await.unwrap() > 0);
        assert_eq!(list_applied_migrations(&pool).await.unwrap().len(), 2);
    }
}
