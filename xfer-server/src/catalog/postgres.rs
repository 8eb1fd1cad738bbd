//! PostgreSQL catalog backend

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{Postgres, QueryBuilder};
use xfer_common::ProductVariant;

use super::query::{list_products_sql, push_search_query, PRODUCT_COLUMNS};
use super::{
    CatalogError, CatalogOverview, CatalogStore, DatabaseSettings, InventoryBucket, SearchTerms,
    OVERVIEW_SAMPLE_SIZE,
};

/// Catalog backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily-connecting pool from URL or discrete settings
    ///
    /// URLs without an explicit `sslmode` require TLS; hosted catalogs only
    /// accept encrypted connections.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Result<Self, CatalogError> {
        let options = match &settings.url {
            Some(url) => {
                let options = PgConnectOptions::from_str(url)
                    .map_err(|e| CatalogError::Config(format!("Invalid DATABASE_URL: {}", e)))?;
                if url.contains("sslmode=") {
                    options
                } else {
                    options.ssl_mode(PgSslMode::Require)
                }
            }
            None => {
                let mut options = PgConnectOptions::new()
                    .host(settings.host.as_deref().unwrap_or("localhost"))
                    .port(settings.port.unwrap_or(5432));
                if let Some(name) = &settings.name {
                    options = options.database(name);
                }
                if let Some(user) = &settings.user {
                    options = options.username(user);
                }
                if let Some(password) = &settings.password {
                    options = options.password(password);
                }
                options
            }
        };

        let pool = PgPoolOptions::new().max_connections(10).connect_lazy_with(options);
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_products(&self) -> Result<Vec<ProductVariant>, CatalogError> {
        let products = sqlx::query_as::<_, ProductVariant>(&list_products_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn search_products(&self, terms: &SearchTerms) -> Result<Vec<ProductVariant>, CatalogError> {
        let mut builder = QueryBuilder::<Postgres>::new("");
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
            "SELECT {} FROM dim_product_variant LIMIT $1",
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
