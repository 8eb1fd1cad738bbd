//! xfer-cli library - command-line client for the inventory transfer service

pub mod client;
pub mod items;
pub mod submit;

pub use client::{ClientError, TransferClient};
pub use items::{ItemSpec, ItemSpecError};
pub use submit::{fill_session, submit_draft, SubmitError, TransferDraft};

use xfer_common::models::TransferDocument;
use xfer_common::ProductVariant;

/// One line of `xfer products` / `xfer search` output
pub fn format_product_line(product: &ProductVariant) -> String {
    let volume = product
        .volume_ml
        .map(|v| format!("{} ml", v))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<12} {:>8}  {}",
        product.sku.as_deref().unwrap_or("-"),
        volume,
        product.display_title()
    )
}

/// Human-readable summary of an accepted transfer
pub fn format_transfer_summary(doc: &TransferDocument) -> String {
    let mut lines = vec![
        format!("Transfer {} submitted", doc.transfer_id),
        format!("  {} -> {}", doc.transfer_from, doc.transfer_to),
    ];
    for item in &doc.items {
        lines.push(format!(
            "  {:<12} {} bottles, {} cases  {}",
            item.sku, item.bottles, item.cases, item.product
        ));
    }
    lines.push(format!(
        "  Total: {} item(s), {} bottles, {} cases",
        doc.summary.total_items, doc.summary.total_bottles, doc.summary.total_cases
    ));
    lines.join("\n")
}
