//! Submission rules shared by the form session and the server
//!
//! Both locations must be present and distinct, and at least one line item
//! must carry a product and a quantity. Items without both are dropped from
//! the transfer rather than rejected.

use crate::error::ValidationError;
use crate::models::{RequestItem, TransferRequest};

/// Transfer request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransfer {
    pub transfer_from: String,
    pub transfer_to: String,
    /// Only the filled line items, in submission order
    pub items: Vec<RequestItem>,
    pub notes: String,
    pub authorized_by: String,
}

/// Apply the submission rules to a request
pub fn validate_request(request: &TransferRequest) -> Result<ValidatedTransfer, ValidationError> {
    let (transfer_from, transfer_to) = validate_locations(&request.transfer_from, &request.transfer_to)?;

    for (index, item) in request.items.iter().enumerate() {
        if item.bottles.is_some_and(|b| b < 0) {
            return Err(ValidationError::NegativeQuantity { index, unit: "bottles" });
        }
        if item.cases.is_some_and(|c| c < 0.0 || c.is_nan()) {
            return Err(ValidationError::NegativeQuantity { index, unit: "cases" });
        }
    }

    let items: Vec<RequestItem> = request.items.iter().filter(|i| i.is_filled()).cloned().collect();
    if items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    Ok(ValidatedTransfer {
        transfer_from,
        transfer_to,
        items,
        notes: request.notes.as_deref().unwrap_or("").trim().to_string(),
        authorized_by: request.authorized_by.as_deref().unwrap_or("").trim().to_string(),
    })
}

/// Check the location pair, returning the trimmed names
pub fn validate_locations(from: &str, to: &str) -> Result<(String, String), ValidationError> {
    let from = from.trim();
    let to = to.trim();

    if from.is_empty() {
        return Err(ValidationError::MissingLocation { field: "transferFrom" });
    }
    if to.is_empty() {
        return Err(ValidationError::MissingLocation { field: "transferTo" });
    }
    if from == to {
        return Err(ValidationError::SameLocation);
    }

    Ok((from.to_string(), to.to_string()))
}
