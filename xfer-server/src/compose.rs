//! Transfer document assembly
//!
//! Quantities are copied exactly as entered. Bottles and cases are summed
//! separately and never converted into each other.

use chrono::{DateTime, SecondsFormat, Utc};
use xfer_common::models::{TransferDocument, TransferItem, TransferSummary};
use xfer_common::validate::ValidatedTransfer;

/// Identifier for a transfer created at `now`
pub fn transfer_id(now: DateTime<Utc>) -> String {
    format!("TR-{}", now.timestamp_millis())
}

/// Build the document for a validated submission
pub fn compose_transfer(transfer: &ValidatedTransfer, now: DateTime<Utc>) -> TransferDocument {
    let items: Vec<TransferItem> = transfer
        .items
        .iter()
        .map(|item| TransferItem {
            product: item.product.clone(),
            sku: item.sku.clone().unwrap_or_default(),
            bottles: item.bottles.unwrap_or(0),
            cases: item.cases.unwrap_or(0.0),
            volume: item.volume,
        })
        .collect();

    let summary = TransferSummary {
        total_bottles: items.iter().map(|i| i.bottles).sum(),
        total_cases: items.iter().map(|i| i.cases).sum(),
        total_items: items.len(),
    };

    TransferDocument {
        transfer_id: transfer_id(now),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        transfer_from: transfer.transfer_from.clone(),
        transfer_to: transfer.transfer_to.clone(),
        items,
        notes: transfer.notes.clone(),
        authorized_by: transfer.authorized_by.clone(),
        summary,
    }
}
