//! Product catalog access
//!
//! The catalog is an external table of product variants that this service
//! reads and never writes. PostgreSQL is the production backend; SQLite serves
//! local development and tests. Both run the same SQL.

mod postgres;
pub mod query;
mod sqlite;

pub use postgres::PgCatalog;
pub use query::{SearchTerms, MAX_SEARCH_RESULTS};
pub use sqlite::{SqliteCatalog, CATALOG_SCHEMA};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use xfer_common::ProductVariant;

/// Catalog read failure
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog configuration error: {0}")]
    Config(String),
}

/// Count of variants per `has_inventory` value
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InventoryBucket {
    pub has_inventory: Option<bool>,
    pub count: i64,
}

/// Snapshot of the catalog for diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverview {
    pub total: i64,
    pub has_inventory_distribution: Vec<InventoryBucket>,
    pub sample_products: Vec<ProductVariant>,
}

/// Number of rows in the diagnostics sample
pub const OVERVIEW_SAMPLE_SIZE: i64 = 10;

/// Read-only access to product variants
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Backend name for logs
    fn backend(&self) -> &'static str;

    /// Every non-bundle variant, ordered by product then variant title
    async fn list_products(&self) -> Result<Vec<ProductVariant>, CatalogError>;

    /// Ranked fuzzy search, at most `MAX_SEARCH_RESULTS` rows
    async fn search_products(&self, terms: &SearchTerms) -> Result<Vec<ProductVariant>, CatalogError>;

    /// Row count, inventory flag distribution and a small sample
    async fn overview(&self) -> Result<CatalogOverview, CatalogError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), CatalogError>;
}

/// Where the catalog lives
///
/// A URL wins over the discrete parameters. `sqlite:` URLs select the SQLite
/// backend; anything else is treated as PostgreSQL.
#[derive(Clone, Default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DatabaseSettings {
    pub fn is_sqlite(&self) -> bool {
        self.url.as_deref().is_some_and(|u| u.starts_with("sqlite:"))
    }

    /// Human-readable target without credentials
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) if self.is_sqlite() => url.clone(),
            Some(url) => match url.rsplit_once('@') {
                Some((_, host_part)) => format!("postgres://…@{}", host_part),
                None => url.clone(),
            },
            None => format!(
                "postgres://{}:{}/{}",
                self.host.as_deref().unwrap_or("localhost"),
                self.port.unwrap_or(5432),
                self.name.as_deref().unwrap_or("")
            ),
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("target", &self.describe())
            .finish()
    }
}

/// Open the configured catalog backend
///
/// PostgreSQL pools connect lazily, so an unreachable server surfaces on the
/// first query (and in the startup ping) rather than here.
pub async fn connect(settings: &DatabaseSettings) -> Result<Arc<dyn CatalogStore>, CatalogError> {
    if settings.is_sqlite() {
        let url = settings.url.as_deref().unwrap_or_default();
        let catalog = SqliteCatalog::connect_readonly(url).await?;
        Ok(Arc::new(catalog))
    } else {
        let catalog = PgCatalog::connect_lazy(settings)?;
        Ok(Arc::new(catalog))
    }
}
