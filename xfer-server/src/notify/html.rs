//! HTML body of the transfer notification

use chrono::{DateTime, Local};
use xfer_common::TransferDocument;

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Document timestamp in the server's local time, or as-is if unparseable
fn display_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("<p><strong>{}:</strong> {}</p>\n", label, value)
}

const CELL: &str = "style=\"padding: 8px;\"";

/// Render the notification body
pub fn render_transfer_html(doc: &TransferDocument) -> String {
    let authorized_by = if doc.authorized_by.is_empty() {
        "Not specified"
    } else {
        doc.authorized_by.as_str()
    };

    let mut html = String::new();
    html.push_str("<h2>Inventory Transfer Request</h2>\n");
    html.push_str(&field("Transfer ID", escape_html(&doc.transfer_id)));
    html.push_str(&field("Date", escape_html(&display_date(&doc.timestamp))));
    html.push_str(&field("From", escape_html(&doc.transfer_from)));
    html.push_str(&field("To", escape_html(&doc.transfer_to)));
    html.push_str(&field("Authorized By", escape_html(authorized_by)));

    html.push_str("<h3>Items to Transfer:</h3>\n");
    html.push_str("<table border=\"1\" style=\"border-collapse: collapse; width: 100%;\">\n");
    html.push_str(&format!(
        "<tr><th {c}>Product</th><th {c}>SKU</th><th {c}>Bottles</th><th {c}>Cases (9L)</th></tr>\n",
        c = CELL
    ));
    for item in &doc.items {
        html.push_str(&format!(
            "<tr><td {c}>{}</td><td {c}>{}</td><td {c}>{}</td><td {c}>{}</td></tr>\n",
            escape_html(&item.product),
            escape_html(&item.sku),
            item.bottles,
            item.cases,
            c = CELL
        ));
    }
    html.push_str("</table>\n");

    if !doc.notes.is_empty() {
        html.push_str("<h3>Additional Notes:</h3>\n");
        html.push_str(&format!(
            "<p style=\"background-color: #f8f9fa; padding: 15px; border-left: 4px solid #667eea; margin: 20px 0;\">{}</p>\n",
            escape_html(&doc.notes)
        ));
    }

    html.push_str("<h3>Summary:</h3>\n");
    html.push_str(&field("Total SKUs", doc.summary.total_items));
    html.push_str(&field("Total Bottles/Units", doc.summary.total_bottles));
    html.push_str(&field("Total Cases", doc.summary.total_cases));
    html
}
