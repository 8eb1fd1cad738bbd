//! Transfer form session
//!
//! Owns everything the transfer form needs between page load and submission:
//! the product catalog, the two location fields, the line-item rows, notes and
//! the authorizer. One session per open form; dropping it discards the state.

mod row;

pub use row::{
    FieldState, LineItemRow, RowId, RowState, SearchTicket, MIN_QUERY_CHARS, SEARCH_DEBOUNCE,
};

use std::time::Instant;

use thiserror::Error;

use crate::error::ValidationError;
use crate::models::{ProductVariant, TransferRequest};
use crate::validate::{validate_request, ValidatedTransfer};

/// Location choice that switches to the free-text override
pub const OTHER_LOCATION: &str = "Other";

/// Interactions the form state does not allow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown line item: {0}")]
    UnknownRow(RowId),

    #[error("At least one item is required.")]
    LastRow,

    #[error("The {field} field of {row} is disabled for this product")]
    FieldDisabled { row: RowId, field: &'static str },

    #[error("No search result #{index} for {row}")]
    NoSuchResult { row: RowId, index: usize },

    #[error("No product with SKU {0} in the catalog")]
    UnknownSku(String),
}

/// A location dropdown with its "Other" text box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationField {
    choice: String,
    other: String,
}

impl LocationField {
    /// Pick a dropdown value; leaving "Other" clears the typed override
    pub fn choose(&mut self, choice: &str) {
        self.choice = choice.to_string();
        if !self.is_other() {
            self.other.clear();
        }
    }

    pub fn set_other(&mut self, text: &str) {
        self.other = text.to_string();
    }

    pub fn is_other(&self) -> bool {
        self.choice == OTHER_LOCATION
    }

    /// The location that will be submitted
    pub fn resolved(&self) -> &str {
        if self.is_other() {
            &self.other
        } else {
            &self.choice
        }
    }
}

/// State of one transfer form
#[derive(Debug, Clone)]
pub struct FormSession {
    catalog: Vec<ProductVariant>,
    from: LocationField,
    to: LocationField,
    rows: Vec<LineItemRow>,
    next_row: u32,
    notes: String,
    authorized_by: String,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    /// Fresh form with a single empty row
    pub fn new() -> Self {
        let mut session = Self {
            catalog: Vec::new(),
            from: LocationField::default(),
            to: LocationField::default(),
            rows: Vec::new(),
            next_row: 0,
            notes: String::new(),
            authorized_by: String::new(),
        };
        session.add_row();
        session
    }

    /// Fresh form over a product list fetched at startup
    pub fn with_catalog(catalog: Vec<ProductVariant>) -> Self {
        let mut session = Self::new();
        session.catalog = catalog;
        session
    }

    pub fn catalog(&self) -> &[ProductVariant] {
        &self.catalog
    }

    /// Exact SKU lookup in the loaded catalog
    pub fn find_by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.catalog
            .iter()
            .find(|p| p.sku.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(sku)))
    }

    // ----- locations -----

    pub fn from_location(&mut self) -> &mut LocationField {
        &mut self.from
    }

    pub fn to_location(&mut self) -> &mut LocationField {
        &mut self.to
    }

    pub fn transfer_from(&self) -> &str {
        self.from.resolved()
    }

    pub fn transfer_to(&self) -> &str {
        self.to.resolved()
    }

    // ----- notes -----

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Character count shown under the notes box
    pub fn notes_char_count(&self) -> usize {
        self.notes.chars().count()
    }

    pub fn set_authorized_by(&mut self, name: &str) {
        self.authorized_by = name.to_string();
    }

    // ----- rows -----

    pub fn rows(&self) -> &[LineItemRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Result<&LineItemRow, FormError> {
        self.rows
            .iter()
            .find(|r| r.id() == id)
            .ok_or(FormError::UnknownRow(id))
    }

    pub fn row_mut(&mut self, id: RowId) -> Result<&mut LineItemRow, FormError> {
        self.rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(FormError::UnknownRow(id))
    }

    /// Append an empty row
    pub fn add_row(&mut self) -> RowId {
        self.next_row += 1;
        let id = RowId(self.next_row);
        self.rows.push(LineItemRow::new(id));
        id
    }

    /// Remove a row; the form always keeps at least one
    pub fn remove_row(&mut self, id: RowId) -> Result<(), FormError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or(FormError::UnknownRow(id))?;
        if self.rows.len() <= 1 {
            return Err(FormError::LastRow);
        }
        self.rows.remove(index);
        Ok(())
    }

    pub fn type_product(&mut self, id: RowId, text: &str, now: Instant) -> Result<(), FormError> {
        self.row_mut(id)?.type_product(text, now);
        Ok(())
    }

    pub fn focus_product(&mut self, id: RowId) -> Result<Option<SearchTicket>, FormError> {
        Ok(self.row_mut(id)?.focus_product())
    }

    /// Searches whose debounce window has elapsed, across all rows
    pub fn due_searches(&mut self, now: Instant) -> Vec<SearchTicket> {
        self.rows
            .iter_mut()
            .filter_map(|r| r.take_due_search(now))
            .collect()
    }

    /// Deliver results for a ticket
    ///
    /// Returns false when the row is gone or has moved on to a newer query.
    pub fn apply_search_results(&mut self, ticket: &SearchTicket, results: Vec<ProductVariant>) -> bool {
        match self.row_mut(ticket.row) {
            Ok(row) => row.apply_results(ticket.seq, results),
            Err(_) => false,
        }
    }

    pub fn select_result(&mut self, id: RowId, index: usize) -> Result<(), FormError> {
        self.row_mut(id)?.select_result(index)
    }

    pub fn select_variant(&mut self, id: RowId, variant: ProductVariant) -> Result<(), FormError> {
        self.row_mut(id)?.select(variant);
        Ok(())
    }

    /// Select a row's product straight from the loaded catalog
    pub fn select_by_sku(&mut self, id: RowId, sku: &str) -> Result<(), FormError> {
        let variant = self
            .find_by_sku(sku)
            .cloned()
            .ok_or_else(|| FormError::UnknownSku(sku.to_string()))?;
        self.select_variant(id, variant)
    }

    pub fn set_bottles(&mut self, id: RowId, bottles: Option<i64>) -> Result<(), FormError> {
        self.row_mut(id)?.set_bottles(bottles)
    }

    pub fn set_cases(&mut self, id: RowId, cases: Option<f64>) -> Result<(), FormError> {
        self.row_mut(id)?.set_cases(cases)
    }

    // ----- submission -----

    /// Request body built from the filled rows
    pub fn collect(&self) -> TransferRequest {
        TransferRequest {
            transfer_from: self.transfer_from().trim().to_string(),
            transfer_to: self.transfer_to().trim().to_string(),
            items: self.rows.iter().filter_map(|r| r.to_request_item()).collect(),
            notes: Some(self.notes.trim().to_string()),
            authorized_by: Some(self.authorized_by.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    /// Check the form with the same rules the server applies
    pub fn validate(&self) -> Result<ValidatedTransfer, ValidationError> {
        validate_request(&self.collect())
    }

    /// Validate and produce the request body to post
    pub fn submit(&self) -> Result<TransferRequest, ValidationError> {
        let request = self.collect();
        validate_request(&request)?;
        Ok(request)
    }

    /// Back to a blank form with one empty row; the catalog is kept
    pub fn reset(&mut self) {
        self.from = LocationField::default();
        self.to = LocationField::default();
        self.rows.clear();
        self.notes.clear();
        self.authorized_by.clear();
        self.add_row();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn variant(id: i64, title: &str, sku: &str, volume: i32) -> ProductVariant {
        ProductVariant {
            product_variant_id: id,
            product_title: title.to_string(),
            variant_title: None,
            volume_ml: Some(volume),
            sku: Some(sku.to_string()),
            sub_title: None,
        }
    }

    fn catalog() -> Vec<ProductVariant> {
        vec![
            variant(1, "Pinot Noir", "PN-750", 750),
            variant(2, "Pinot Noir Magnum", "PN-1500", 1500),
            variant(3, "Late Harvest", "LH-375", 375),
        ]
    }

    #[test]
    fn test_new_session_has_one_row() {
        let session = FormSession::new();
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].id(), RowId(1));
    }

    #[test]
    fn test_cannot_remove_last_row() {
        let mut session = FormSession::new();
        let first = session.rows()[0].id();
        assert_eq!(session.remove_row(first), Err(FormError::LastRow));

        let second = session.add_row();
        session.remove_row(first).unwrap();
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].id(), second);
        assert_eq!(session.remove_row(first), Err(FormError::UnknownRow(first)));
    }

    #[test]
    fn test_row_ids_are_never_reused() {
        let mut session = FormSession::new();
        let a = session.add_row();
        session.remove_row(a).unwrap();
        let b = session.add_row();
        assert_ne!(a, b);
    }

    #[test]
    fn test_other_location_uses_override() {
        let mut session = FormSession::new();
        session.from_location().choose(OTHER_LOCATION);
        session.from_location().set_other("Offsite Storage");
        assert_eq!(session.transfer_from(), "Offsite Storage");

        session.from_location().choose("Groskopf");
        assert_eq!(session.transfer_from(), "Groskopf");
        session.from_location().choose(OTHER_LOCATION);
        assert_eq!(session.transfer_from(), "");
    }

    #[test]
    fn test_search_flow_across_rows() {
        let start = Instant::now();
        let mut session = FormSession::with_catalog(catalog());
        let first = session.rows()[0].id();
        let second = session.add_row();

        session.type_product(first, "pinot", start).unwrap();
        session.type_product(second, "late", start + Duration::from_millis(100)).unwrap();

        let due = session.due_searches(start + Duration::from_millis(300));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].row, first);

        let due_later = session.due_searches(start + Duration::from_millis(400));
        assert_eq!(due_later.len(), 1);
        assert_eq!(due_later[0].row, second);

        assert!(session.apply_search_results(&due[0], vec![catalog()[0].clone()]));
        session.select_result(first, 0).unwrap();
        assert_eq!(session.row(first).unwrap().sku(), "PN-750");
    }

    #[test]
    fn test_results_for_removed_row_are_ignored() {
        let start = Instant::now();
        let mut session = FormSession::new();
        let extra = session.add_row();
        session.type_product(extra, "pinot", start).unwrap();
        let ticket = session.due_searches(start + SEARCH_DEBOUNCE).remove(0);

        session.remove_row(extra).unwrap();
        assert!(!session.apply_search_results(&ticket, catalog()));
    }

    #[test]
    fn test_select_by_sku() {
        let mut session = FormSession::with_catalog(catalog());
        let row = session.rows()[0].id();
        session.select_by_sku(row, "lh-375").unwrap();
        assert!(!session.row(row).unwrap().fields().cases_enabled);

        assert_eq!(
            session.select_by_sku(row, "NOPE"),
            Err(FormError::UnknownSku("NOPE".to_string()))
        );
    }

    #[test]
    fn test_validation_requires_distinct_locations() {
        let mut session = FormSession::with_catalog(catalog());
        let row = session.rows()[0].id();
        session.select_by_sku(row, "PN-750").unwrap();
        session.set_bottles(row, Some(6)).unwrap();

        assert_eq!(
            session.validate().unwrap_err(),
            ValidationError::MissingLocation { field: "transferFrom" }
        );

        session.from_location().choose("Groskopf");
        session.to_location().choose("Groskopf");
        assert_eq!(session.validate().unwrap_err(), ValidationError::SameLocation);

        session.to_location().choose("Donum - Tasting Room");
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_a_filled_row() {
        let mut session = FormSession::with_catalog(catalog());
        session.from_location().choose("A");
        session.to_location().choose("B");

        // Product but no quantity
        let row = session.rows()[0].id();
        session.select_by_sku(row, "PN-750").unwrap();
        assert_eq!(session.submit().unwrap_err(), ValidationError::NoItems);

        // Quantity but no product
        let other = session.add_row();
        session.set_bottles(other, Some(3)).unwrap();
        assert_eq!(session.submit().unwrap_err(), ValidationError::NoItems);

        session.set_cases(row, Some(1.0)).unwrap();
        let request = session.submit().unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].cases, Some(1.0));
        assert_eq!(request.items[0].bottles, Some(0));
    }

    #[test]
    fn test_reset_keeps_catalog() {
        let mut session = FormSession::with_catalog(catalog());
        session.from_location().choose("A");
        session.set_notes("hello");
        session.add_row();
        session.reset();

        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.transfer_from(), "");
        assert_eq!(session.notes_char_count(), 0);
        assert_eq!(session.catalog().len(), 3);
    }

    #[test]
    fn test_notes_char_count_counts_characters() {
        let mut session = FormSession::new();
        session.set_notes("café");
        assert_eq!(session.notes_char_count(), 4);
    }
}
