//! Data model shared by the server, the CLI and the form session
//!
//! Catalog rows keep the column names of the catalog table on the wire
//! (snake_case). Transfer payloads use the camelCase names the web form posts.

use serde::{Deserialize, Deserializer, Serialize};

/// Sub-title marker for bundle listings that never appear in search or listings
pub const BUNDLE_MARKER: &str = "Wine Bundle";

/// Message returned with a successful submission
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Transfer request submitted successfully";

/// A sellable product variant from the external catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub product_variant_id: i64,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub volume_ml: Option<i32>,
    pub sku: Option<String>,
    pub sub_title: Option<String>,
}

impl ProductVariant {
    /// Title shown in the form once the variant is selected
    ///
    /// `"Title - Variant"` when a variant title exists, else just the title.
    pub fn display_title(&self) -> String {
        match self.variant_title.as_deref().filter(|v| !v.is_empty()) {
            Some(variant) => format!("{} - {}", self.product_title, variant),
            None => self.product_title.clone(),
        }
    }

    /// True if the sub-title marks this row as a bundle listing
    pub fn is_bundle(&self) -> bool {
        self.sub_title
            .as_deref()
            .map(|s| s.to_lowercase().contains(&BUNDLE_MARKER.to_lowercase()))
            .unwrap_or(false)
    }
}

/// One line item as submitted by the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    #[serde(default)]
    pub product: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32", skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    #[serde(default)]
    pub bottles: Option<i64>,
    #[serde(default)]
    pub cases: Option<f64>,
}

impl RequestItem {
    /// Included in a transfer only with a product and at least one quantity
    pub fn is_filled(&self) -> bool {
        !self.product.trim().is_empty() && (self.bottles.is_some() || self.cases.is_some())
    }
}

/// Body of `POST /api/transfer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default)]
    pub transfer_from: String,
    #[serde(default)]
    pub transfer_to: String,
    #[serde(default)]
    pub items: Vec<RequestItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_by: Option<String>,
}

/// A line item as it appears in the composed transfer document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferItem {
    pub product: String,
    pub sku: String,
    pub bottles: i64,
    pub cases: f64,
    pub volume: Option<u32>,
}

/// Totals across the included line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub total_bottles: i64,
    pub total_cases: f64,
    pub total_items: usize,
}

/// Ephemeral transfer record, emailed and returned but never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDocument {
    pub transfer_id: String,
    pub timestamp: String,
    pub transfer_from: String,
    pub transfer_to: String,
    pub items: Vec<TransferItem>,
    pub notes: String,
    pub authorized_by: String,
    pub summary: TransferSummary,
}

/// Success body of `POST /api/transfer`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
    pub transfer_doc: TransferDocument,
}

/// Body of every non-2xx API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accept a string or a number; empty strings and null become `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Int(n)) => Some(n.to_string()),
        Some(NumberOrText::Float(n)) => Some(n.to_string()),
        Some(NumberOrText::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Accept a non-negative integer as a number or numeric string
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(NumberOrText::Int(n)) => u32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("volume out of range: {}", n))),
        Some(NumberOrText::Float(n)) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Ok(Some(n as u32))
        }
        Some(NumberOrText::Float(n)) => Err(D::Error::custom(format!("invalid volume: {}", n))),
        Some(NumberOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() || s == "null" || s == "undefined" {
                Ok(None)
            } else {
                s.parse::<u32>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid volume: {}", s)))
            }
        }
    }
}
