//! SQLite catalog backend
//!
//! Used with a local copy of the catalog table for development, and by the
//! test suite with an in-memory database.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use xfer_common::ProductVariant;

use super::query::{list_products_sql, push_search_query, PRODUCT_COLUMNS};
use super::{
    CatalogError, CatalogOverview, CatalogStore, InventoryBucket, SearchTerms, OVERVIEW_SAMPLE_SIZE,
};

/// Shape of the catalog table this service reads
pub const CATALOG_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dim_product_variant (
    product_variant_id INTEGER PRIMARY KEY,
    product_title TEXT NOT NULL,
    variant_title TEXT,
    volume_ml INTEGER,
    sku TEXT,
    sub_title TEXT,
    has_inventory BOOLEAN
)
"#;

/// Catalog backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a catalog file read-only
    pub async fn connect_readonly(url: &str) -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str(url)?.read_only(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list_products(&self) -> Result<Vec<ProductVariant>, CatalogError> {
        let products = sqlx::query_as::<_, ProductVariant>(&list_products_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn search_products(&self, terms: &SearchTerms) -> Result<Vec<ProductVariant>, CatalogError> {
        let mut builder = QueryBuilder::<Sqlite>::new("");
        push_search_query(&mut builder, terms);
        let products = builder
            .build_query_as::<ProductVariant>()
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn overview(&self) -> Result<CatalogOverview, CatalogError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dim_product_variant")
            .fetch_one(&self.pool)
            .await?;

        let has_inventory_distribution = sqlx::query_as::<_, InventoryBucket>(
            "SELECT has_inventory, COUNT(*) AS count FROM dim_product_variant GROUP BY has_inventory",
        )
        .fetch_all(&self.pool)
        .await?;

        let sample_products = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {} FROM dim_product_variant LIMIT ?",
            PRODUCT_COLUMNS
        ))
        .bind(OVERVIEW_SAMPLE_SIZE)
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogOverview {
            total,
            has_inventory_distribution,
            sample_products,
        })
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
