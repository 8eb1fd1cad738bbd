//! # Transfer Common Library
//!
//! Shared code for the inventory transfer service and its clients:
//! - Data model (catalog rows, transfer requests and documents)
//! - Bottle/case unit conversion
//! - Submission validation rules
//! - The transfer form session state machine
//! - Configuration file helpers

pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod units;
pub mod validate;

pub use error::{Error, Result, ValidationError};
pub use form::FormSession;
pub use models::{ProductVariant, RequestItem, TransferDocument, TransferRequest};
