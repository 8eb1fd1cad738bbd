//! Common error types for the transfer service

use thiserror::Error;

/// Common result type for transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the transfer crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Submission rejected by the shared validation rules
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Form interaction that the current form state does not allow
    #[error(transparent)]
    Form(#[from] crate::form::FormError),
}

/// Field-level validation failure for a transfer submission
///
/// The display text is what clients see in the `{error}` body, so each
/// message names the offending field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A location was missing or blank
    #[error("{field} is required")]
    MissingLocation { field: &'static str },

    /// Source and destination are the same location
    #[error("transferFrom and transferTo must be different")]
    SameLocation,

    /// No line item has both a product and a quantity
    #[error("At least one item with a product and an amount is required")]
    NoItems,

    /// A quantity field carried a negative number
    #[error("items[{index}].{unit} must not be negative")]
    NegativeQuantity { index: usize, unit: &'static str },
}

impl ValidationError {
    /// Name of the request field the error refers to
    pub fn field(&self) -> String {
        match self {
            ValidationError::MissingLocation { field } => field.to_string(),
            ValidationError::SameLocation => "transferTo".to_string(),
            ValidationError::NoItems => "items".to_string(),
            ValidationError::NegativeQuantity { index, unit } => format!("items[{}].{}", index, unit),
        }
    }
}
