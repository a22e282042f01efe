//! # Application State & Configuration
//!
//! [`AppConfig`] is read from the environment once at startup; an invalid
//! value is a startup error, never a silent default. [`AppState`] is the
//! shared handler state: the exchange service, the optional Postgres pool
//! and the optional Prometheus handle.
//!
//! ## Persistence
//!
//! The in-memory repository inside the service is authoritative. When a
//! pool is present, every package a request changed is written through
//! after the operation, under the package's lock, and the repository is
//! hydrated from the table on startup. A failed write does not fail the
//! request.

use std::path::PathBuf;
use std::sync::Arc;

use exh_catalog::{CatalogError, InMemoryCatalog, ReferenceDefaults, ReferenceResolver};
use exh_core::{LocalZone, PackageId, SystemClock};
use exh_exchange::config::DEFAULT_MAX_FILE_BYTES;
use exh_exchange::{ExchangeConfig, ExchangeService};
use exh_storage::{LocalBlobStore, StorageError};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use thiserror::Error;


// ── Configuration ────────────────────────────────────────────────────

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("blob store: {0}")]
    Storage(#[from] StorageError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Root directory of the local blob store.
    pub blob_root: PathBuf,
    /// YAML seed of the reference catalog.
    pub catalog_path: PathBuf,
    pub local_zone: LocalZone,
    pub max_file_bytes: u64,
    pub defaults: ReferenceDefaults,
    /// INEGI code of the estado this deployment serves.
    pub estado_clave: String,
    /// Base URL used for `urlInfo` in exhorto acuses.
    pub public_base_url: Option<String>,
    /// Base URL the blob root is served from. Stored file URLs are
    /// `{base}/{locator}`, or the bare locator when unset.
    pub blob_public_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            blob_root: PathBuf::from("./data/blobs"),
            catalog_path: PathBuf::from("./catalog/seed.yaml"),
            local_zone: LocalZone::parse("-06:00").unwrap_or_else(|_| LocalZone::utc()),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            defaults: ReferenceDefaults::default(),
            estado_clave: "05".to_string(),
            public_base_url: None,
            blob_public_base_url: None,
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`. Unset and blank variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("PORT") {
            config.port = v.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
                reason: format!("{e}"),
            })?;
        }
        if let Some(v) = get("BLOB_ROOT") {
            config.blob_root = PathBuf::from(v);
        }
        if let Some(v) = get("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(v);
        }
        if let Some(v) = get("LOCAL_UTC_OFFSET") {
            config.local_zone = LocalZone::parse(&v).map_err(|e| ConfigError::Invalid {
                var: "LOCAL_UTC_OFFSET",
                value: v.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = get("MAX_FILE_BYTES") {
            config.max_file_bytes = match v.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "MAX_FILE_BYTES",
                        value: v,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "MAX_FILE_BYTES",
                        value: v,
                        reason: e.to_string(),
                    })
                }
            };
        }
        if let Some(v) = get("DEFAULT_AREA_CLAVE") {
            config.defaults.area_clave = v.trim().to_uppercase();
        }
        if let Some(v) = get("DEFAULT_AUTORIDAD_CLAVE") {
            config.defaults.autoridad_clave = v.trim().to_uppercase();
        }
        if let Some(v) = get("LOCAL_ESTADO_CLAVE") {
            config.estado_clave =
                exh_catalog::pad_estado(&v).ok_or_else(|| ConfigError::Invalid {
                    var: "LOCAL_ESTADO_CLAVE",
                    value: v.clone(),
                    reason: "expected a numeric estado code of at most two digits".to_string(),
                })?;
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            config.public_base_url = Some(http_url("PUBLIC_BASE_URL", v)?);
        }
        if let Some(v) = get("BLOB_PUBLIC_BASE_URL") {
            config.blob_public_base_url = Some(http_url("BLOB_PUBLIC_BASE_URL", v)?);
        }
        Ok(config)
    }

    /// The settings handed to the exchange core.
    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            max_file_bytes: self.max_file_bytes,
            local_zone: self.local_zone,
            estado_clave: self.estado_clave.clone(),
            defaults: self.defaults.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

fn http_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    let value = value.trim().to_string();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var,
            value,
            reason: "must start with http:// or https://".to_string(),
        })
    }
}

// ── Application state ────────────────────────────────────────────────

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: ExchangeService,
    /// PostgreSQL pool for write-through. `None` runs in-memory only.
    pub db_pool: Option<PgPool>,
    /// Prometheus exporter handle, rendered at `/metrics`.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State around an already-built service, without a database or
    /// exporter.
    pub fn new(service: ExchangeService) -> Self {
        Self {
            service,
            db_pool: None,
            metrics: None,
        }
    }

    /// Build the production state from `config`.
    ///
    /// Loads the catalog seed, opens the blob store and verifies that the
    /// configured default area and autoridad exist.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let catalog = Arc::new(InMemoryCatalog::from_yaml_file(&config.catalog_path)?);
        ReferenceResolver::new(catalog.clone(), config.defaults.clone()).check_defaults()?;

        let mut blobs = LocalBlobStore::new(&config.blob_root).await?;
        if let Some(base) = &config.blob_public_base_url {
            blobs = blobs.with_public_base_url(base.as_str());
        }
        tracing::info!(
            catalog = %config.catalog_path.display(),
            blob_root = %config.blob_root.display(),
            blob_base_url = config.blob_public_base_url.as_deref().unwrap_or("-"),
            estado = %config.estado_clave,
            "exchange configured"
        );

        let service = ExchangeService::new(
            catalog,
            Arc::new(blobs),
            Arc::new(SystemClock),
            config.exchange_config(),
        );
        Ok(Self::new(service))
    }

    pub fn with_db_pool(mut self, pool: Option<PgPool>) -> Self {
        self.db_pool = pool;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Hydrate the repository from the database. No-op without a pool.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let packages = crate::db::packages::load_all(pool)
            .await
            .map_err(|e| format!("failed to load packages: {e}"))?;
        let count = packages.len();
        for package in packages {
            let id = package.id;
            self.service
                .restore(package)
                .map_err(|e| format!("failed to restore package {id}: {e}"))?;
        }

        tracing::info!(packages = count, "hydrated repository from database");
        Ok(())
    }

    /// Write the current state of each changed package through to the
    /// database. No-op without a pool.
    ///
    /// The in-memory operation has already happened and its acuse must
    /// reach the sender, so a failed write is logged and counted, not
    /// returned. The package lock is held across the write.
    pub async fn persist(&self, changed: &[PackageId]) {
        let Some(pool) = &self.db_pool else {
            return;
        };
        for id in changed {
            let Some(package) = self.service.lock_for_write(id).await else {
                continue;
            };
            if let Err(e) = crate::db::packages::upsert(pool, &package).await {
                metrics::counter!("exh_persist_failures_total").increment(1);
                tracing::error!(error = %e, package_id = %id, "failed to persist package to database");
            }
        }
    }
}
