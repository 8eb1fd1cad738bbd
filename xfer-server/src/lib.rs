//! xfer-server library - inventory transfer request service
//!
//! Serves the product catalog to the transfer form and turns submitted
//! requests into emailed transfer documents.

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod notify;

use catalog::CatalogStore;
use notify::Notifier;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Product catalog (read-only)
    pub catalog: Arc<dyn CatalogStore>,
    pub notifier: Arc<Notifier>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, notifier: Notifier) -> Self {
        Self {
            catalog,
            notifier: Arc::new(notifier),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(api::list_products))
        .route("/api/products/search", get(api::search_products))
        .route("/api/debug/products", get(api::debug_products))
        .route("/api/transfer", post(api::submit_transfer))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the form's static files for any path the API does not claim
///
/// Skipped when the directory does not exist.
pub fn with_static_files(router: Router, dir: &Path) -> Router {
    if dir.is_dir() {
        info!("Serving static files from {}", dir.display());
        router.fallback_service(ServeDir::new(dir))
    } else {
        info!("Static directory {} not found; serving API only", dir.display());
        router
    }
}
