//! # TLS Registry Service
//!
//! The front door of the crate: CRUD for named SSL configurations, hostname
//! binding, and per-URL resolution into a transport-layer client config.
//! Callers hand in full request URLs; the service normalizes them to binding
//! keys so that lookups and bindings always agree on the key form.

use crate::config::AppConfig;
use crate::domain::{SslConfig, SslConfigId, SslConfigInput};
use crate::errors::Result;
use crate::export::TlsClientConfig;
use crate::secrets::SecretCodec;
use crate::storage::{
    create_pool, DbPool, HostnameMapping, HostnameMappingRepository, SqlxHostnameMappingRepository,
    SqlxSslConfigRepository, SslConfigRepository,
};
use crate::utils::host_key;
use tracing::debug;

/// Outcome of resolving a URL to a client configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No binding exists for the URL's hostname key.
    Unbound,
    /// A binding exists but its configuration was deleted.
    BoundWithoutConfig,
    /// The bound configuration, flattened for the transport layer.
    Config(TlsClientConfig),
}

/// Registry service over a shared connection pool.
#[derive(Clone, Debug)]
pub struct TlsRegistry {
    configs: SqlxSslConfigRepository,
    bindings: SqlxHostnameMappingRepository,
}

impl TlsRegistry {
    pub fn new(pool: DbPool, codec: SecretCodec) -> Self {
        Self {
            configs: SqlxSslConfigRepository::new(pool.clone(), codec),
            bindings: SqlxHostnameMappingRepository::new(pool),
        }
    }

    /// Build the registry from application configuration: creates the pool
    /// (running migrations if enabled) and the secret codec.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let pool = create_pool(&config.database).await?;
        let codec = SecretCodec::new(&config.secrets)?;
        Ok(Self::new(pool, codec))
    }

    // --- SSL configuration CRUD -----------------------------------------

    pub async fn create_config(&self, input: SslConfigInput) -> Result<SslConfig> {
        self.configs.create(input).await
    }

    pub async fn get_config(&self, id: &SslConfigId) -> Result<SslConfig> {
        self.configs.get_by_id(id).await
    }

    pub async fn get_config_by_name(&self, name: &str) -> Result<SslConfig> {
        self.configs.get_by_name(name).await
    }

    pub async fn list_configs(&self) -> Result<Vec<SslConfig>> {
        self.configs.list().await
    }

    pub async fn update_config(
        &self,
        id: &SslConfigId,
        input: SslConfigInput,
    ) -> Result<SslConfig> {
        self.configs.update(id, input).await
    }

    /// Delete a configuration. Bindings that pointed at it survive with a
    /// null config reference.
    pub async fn delete_config(&self, id: &SslConfigId) -> Result<()> {
        self.configs.delete(id).await
    }

    // --- Hostname bindings ----------------------------------------------

    /// Bind the hostname key of `url` to a configuration (or to nothing).
    /// Accepts full URLs or bare `host[:port]` targets.
    pub async fn bind_url(
        &self,
        url: &str,
        ssl_config_id: Option<&SslConfigId>,
    ) -> Result<HostnameMapping> {
        let key = host_key(url)?;
        self.bindings.upsert(&key, ssl_config_id).await
    }

    /// Remove the binding for the hostname key of `url`.
    pub async fn unbind_url(&self, url: &str) -> Result<()> {
        let key = host_key(url)?;
        self.bindings.delete(&key).await
    }

    /// Look up the binding for the hostname key of `url`, if any.
    pub async fn resolve_url(&self, url: &str) -> Result<Option<HostnameMapping>> {
        let key = host_key(url)?;
        self.bindings.resolve(&key).await
    }

    pub async fn list_bindings(&self) -> Result<Vec<HostnameMapping>> {
        self.bindings.list().await
    }

    // --- Resolution -----------------------------------------------------

    /// Resolve `url` all the way to a transport-layer client config.
    ///
    /// Unbound hosts and bindings whose configuration has been deleted are
    /// ordinary outcomes, not errors; the caller falls back to its ambient
    /// TLS defaults for both.
    pub async fn client_config_for(&self, url: &str) -> Result<Resolution> {
        let key = host_key(url)?;

        let Some(mapping) = self.bindings.resolve(&key).await? else {
            debug!(key, "No TLS binding for host");
            return Ok(Resolution::Unbound);
        };

        let Some(config_id) = mapping.ssl_config_id else {
            debug!(key, "Host is bound but its SSL config was deleted");
            return Ok(Resolution::BoundWithoutConfig);
        };

        let config = self.configs.get_by_id(&config_id).await?;
        debug!(key, config = %config.name, "Resolved TLS client config");
        Ok(Resolution::Config(config.to_client_config()))
    }
}
