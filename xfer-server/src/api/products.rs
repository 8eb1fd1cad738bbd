//! Product catalog endpoints
//!
//! Listing and search exclude wine bundles. Search takes the raw text the
//! user typed; a blank query answers `[]` without touching the catalog.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xfer_common::ProductVariant;

use crate::catalog::{CatalogOverview, SearchTerms};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query string for `/api/products/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductVariant>>> {
    let products = state
        .catalog
        .list_products()
        .await
        .map_err(ApiError::ProductsUnavailable)?;

    debug!("Listed {} products", products.len());
    Ok(Json(products))
}

/// GET /api/products/search?q=<text>
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ProductVariant>>> {
    let Some(terms) = params.q.as_deref().and_then(SearchTerms::parse) else {
        return Ok(Json(Vec::new()));
    };

    let results = state
        .catalog
        .search_products(&terms)
        .await
        .map_err(ApiError::SearchUnavailable)?;

    debug!("Search {:?} matched {} products", terms.query(), results.len());
    Ok(Json(results))
}

/// Diagnostics response
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    #[serde(flatten)]
    pub overview: CatalogOverview,
    pub message: String,
}

/// GET /api/debug/products
pub async fn debug_products(State(state): State<AppState>) -> ApiResult<Json<DebugResponse>> {
    let overview = state
        .catalog
        .overview()
        .await
        .map_err(ApiError::DiagnosticsUnavailable)?;

    let message = format!(
        "Catalog has {} product variants ({} backend)",
        overview.total,
        state.catalog.backend()
    );

    Ok(Json(DebugResponse { overview, message }))
}
