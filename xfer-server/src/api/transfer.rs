//! Transfer submission endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};
use xfer_common::models::{TransferResponse, SUBMIT_SUCCESS_MESSAGE};
use xfer_common::validate::validate_request;
use xfer_common::TransferRequest;

use crate::compose::compose_transfer;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/transfer
///
/// Validates the request, builds the transfer document and emails it. The
/// document is returned only once the mail relay has accepted it.
pub async fn submit_transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<TransferResponse>> {
    let Json(request) = payload.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;

    let transfer = validate_request(&request).inspect_err(|e| {
        warn!("Rejected transfer request: {}", e);
    })?;

    let doc = compose_transfer(&transfer, Utc::now());
    info!(
        transfer_id = %doc.transfer_id,
        from = %doc.transfer_from,
        to = %doc.transfer_to,
        items = doc.summary.total_items,
        "Transfer request composed"
    );

    state
        .notifier
        .send_transfer(&doc)
        .await
        .map_err(ApiError::Delivery)?;

    Ok(Json(TransferResponse {
        success: true,
        message: SUBMIT_SUCCESS_MESSAGE.to_string(),
        transfer_doc: doc,
    }))
}
