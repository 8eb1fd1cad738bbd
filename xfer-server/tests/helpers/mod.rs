//! Shared fixtures for xfer-server integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use xfer_server::catalog::{SqliteCatalog, CATALOG_SCHEMA};
use xfer_server::notify::{MailRelay, NotifyError, Notifier, OutgoingMail, RecipientRouter};
use xfer_server::{build_router, AppState};

pub const OFFICER: &str = "officer@example.com";
pub const TECHNICIAN: &str = "tech@example.com";

/// In-memory catalog with a handful of variants, one of them a bundle
pub async fn memory_catalog() -> SqliteCatalog {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    sqlx::query(CATALOG_SCHEMA)
        .execute(&pool)
        .await
        .expect("Should create catalog table");

    sqlx::query(
        "INSERT INTO dim_product_variant
             (product_variant_id, product_title, variant_title, volume_ml, sku, sub_title, has_inventory)
         VALUES
             (1, 'Pinot Noir', '2019', 750, 'PN19', NULL, 1),
             (2, 'Pinot Noir', '2020 Magnum', 1500, 'PN20M', NULL, 1),
             (3, 'Chardonnay Reserve', NULL, 375, 'CH375', NULL, 0),
             (4, 'Pinot Noir Gift Set', NULL, 750, 'PNGIFT', 'Holiday Wine Bundle', 1),
             (5, 'Noir Special Pinot', NULL, 750, 'NSP', NULL, NULL),
             (6, 'Estate Rose', NULL, 750, 'ER', 'Limited release', 1)",
    )
    .execute(&pool)
    .await
    .expect("Should seed catalog");

    SqliteCatalog::new(pool)
}

/// Relay that keeps every message it is handed
#[derive(Default)]
pub struct RecordingRelay {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingRelay {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailRelay for RecordingRelay {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Relay whose server always refuses the message
pub struct FailingRelay;

#[async_trait]
impl MailRelay for FailingRelay {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _mail: &OutgoingMail) -> Result<(), NotifyError> {
        Err(NotifyError::Relay("554 relay access denied".to_string()))
    }
}

pub fn notifier(relay: Arc<dyn MailRelay>) -> Notifier {
    Notifier::new(
        relay,
        RecipientRouter::with_default_routes(OFFICER, Some(TECHNICIAN.to_string())),
        "inventory@example.com",
    )
}

pub fn setup_app(catalog: SqliteCatalog, relay: Arc<dyn MailRelay>) -> axum::Router {
    build_router(AppState::new(Arc::new(catalog), notifier(relay)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
