//! Error types for xfer-server
//!
//! Every failure leaves the API as `{"error": "<message>"}`. Client mistakes
//! get a field-level message; server-side failures get a generic one, with the
//! underlying cause logged here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use xfer_common::models::ErrorBody;
use xfer_common::ValidationError;

use crate::catalog::CatalogError;
use crate::notify::NotifyError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Submission failed validation (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body was not a transfer request (400)
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Catalog listing failed (500)
    #[error("Failed to fetch products")]
    ProductsUnavailable(#[source] CatalogError),

    /// Catalog search failed (500)
    #[error("Failed to search products")]
    SearchUnavailable(#[source] CatalogError),

    /// Catalog diagnostics failed (500)
    #[error("Debug failed")]
    DiagnosticsUnavailable(#[source] CatalogError),

    /// Notification could not be delivered (500)
    #[error("Failed to submit transfer request")]
    Delivery(#[source] NotifyError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::ProductsUnavailable(_)
            | ApiError::SearchUnavailable(_)
            | ApiError::DiagnosticsUnavailable(_)
            | ApiError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::ProductsUnavailable(e)
            | ApiError::SearchUnavailable(e)
            | ApiError::DiagnosticsUnavailable(e) => error!("{}: {}", self, e),
            ApiError::Delivery(e) => error!("{}: {}", self, e),
            ApiError::Validation(_) | ApiError::MalformedBody(_) => {}
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
