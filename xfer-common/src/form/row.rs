//! One line item of the transfer form
//!
//! A row moves `Empty → Searching → Selected`. Product searches are debounced
//! and sequenced: every edit bumps the row's sequence number, and results are
//! only accepted for the latest one, so a slow response to an older query can
//! never overwrite what the user is looking at now.

use std::fmt;
use std::time::{Duration, Instant};

use crate::models::{ProductVariant, RequestItem};
use crate::units;

use super::FormError;

/// Minimum trimmed query length that triggers a search
pub const MIN_QUERY_CHARS: usize = 2;

/// Quiet period between the last keystroke and the search request
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Stable identifier of a row within one form session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Product selection state of a row
#[derive(Debug, Clone, PartialEq)]
pub enum RowState {
    Empty,
    Searching,
    Selected(ProductVariant),
}

/// Which quantity inputs accept values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub bottles_enabled: bool,
    pub cases_enabled: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            bottles_enabled: true,
            cases_enabled: true,
        }
    }
}

/// A search the caller should run against `/api/products/search`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub row: RowId,
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    ticket: SearchTicket,
    due: Instant,
}

/// A single product/quantity row
#[derive(Debug, Clone)]
pub struct LineItemRow {
    id: RowId,
    product_text: String,
    state: RowState,
    sku: String,
    bottles: Option<i64>,
    cases: Option<f64>,
    fields: FieldState,
    results: Vec<ProductVariant>,
    latest_seq: u64,
    pending: Option<PendingSearch>,
}

impl LineItemRow {
    /// New empty row; both quantity fields start enabled
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            product_text: String::new(),
            state: RowState::Empty,
            sku: String::new(),
            bottles: None,
            cases: None,
            fields: FieldState::default(),
            results: Vec::new(),
            latest_seq: 0,
            pending: None,
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn product_text(&self) -> &str {
        &self.product_text
    }

    pub fn state(&self) -> &RowState {
        &self.state
    }

    pub fn selected(&self) -> Option<&ProductVariant> {
        match &self.state {
            RowState::Selected(variant) => Some(variant),
            _ => None,
        }
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn bottles(&self) -> Option<i64> {
        self.bottles
    }

    pub fn cases(&self) -> Option<f64> {
        self.cases
    }

    pub fn fields(&self) -> FieldState {
        self.fields
    }

    /// Candidates from the most recent accepted search
    pub fn results(&self) -> &[ProductVariant] {
        &self.results
    }

    /// Scheduled search that has not been taken yet
    pub fn pending_search(&self) -> Option<&SearchTicket> {
        self.pending.as_ref().map(|p| &p.ticket)
    }

    /// Handle an edit of the product field
    ///
    /// Blank text resets the row. Short text hides results. Otherwise a search
    /// is scheduled `SEARCH_DEBOUNCE` after `now`, replacing any earlier one.
    pub fn type_product(&mut self, text: &str, now: Instant) {
        self.latest_seq += 1;
        self.pending = None;
        self.product_text = text.to_string();

        let query = text.trim();
        if query.is_empty() {
            self.clear();
            return;
        }

        // Editing the title of a chosen product abandons the selection
        if matches!(self.state, RowState::Selected(_)) {
            self.sku.clear();
        }
        self.state = RowState::Searching;

        if query.chars().count() < MIN_QUERY_CHARS {
            self.results.clear();
            return;
        }

        self.pending = Some(PendingSearch {
            ticket: SearchTicket {
                row: self.id,
                seq: self.latest_seq,
                query: query.to_string(),
            },
            due: now + SEARCH_DEBOUNCE,
        });
    }

    /// Focusing a field that already holds a query searches immediately
    pub fn focus_product(&mut self) -> Option<SearchTicket> {
        let query = self.product_text.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return None;
        }

        self.latest_seq += 1;
        self.pending = None;
        Some(SearchTicket {
            row: self.id,
            seq: self.latest_seq,
            query: query.to_string(),
        })
    }

    /// Take the scheduled search once its debounce window has elapsed
    pub fn take_due_search(&mut self, now: Instant) -> Option<SearchTicket> {
        match &self.pending {
            Some(pending) if pending.due <= now => self.pending.take().map(|p| p.ticket),
            _ => None,
        }
    }

    /// Store search results; returns false when they are stale
    pub fn apply_results(&mut self, seq: u64, results: Vec<ProductVariant>) -> bool {
        if seq != self.latest_seq || self.state == RowState::Empty {
            return false;
        }
        self.results = results;
        true
    }

    /// Pick one of the displayed candidates
    pub fn select_result(&mut self, index: usize) -> Result<(), FormError> {
        let variant = self
            .results
            .get(index)
            .cloned()
            .ok_or(FormError::NoSuchResult { row: self.id, index })?;
        self.select(variant);
        Ok(())
    }

    /// Lock the row onto a product variant
    pub fn select(&mut self, variant: ProductVariant) {
        self.latest_seq += 1;
        self.pending = None;
        self.results.clear();
        self.product_text = variant.display_title();
        self.sku = variant.sku.clone().unwrap_or_default();

        // 750/1500 mL keep both inputs; other known sizes are bottles only.
        // An unknown or zero volume leaves the inputs as they were.
        match variant.volume_ml {
            Some(volume) if volume > 0 => {
                if units::is_case_volume(volume as u32) {
                    self.fields = FieldState::default();
                } else {
                    self.fields = FieldState {
                        bottles_enabled: true,
                        cases_enabled: false,
                    };
                    self.cases = None;
                }
            }
            _ => {}
        }

        self.state = RowState::Selected(variant);
    }

    /// Reset to an empty row
    pub fn clear(&mut self) {
        self.product_text.clear();
        self.state = RowState::Empty;
        self.sku.clear();
        self.bottles = None;
        self.cases = None;
        self.fields = FieldState::default();
        self.results.clear();
        self.pending = None;
    }

    /// Set the bottle count; negative input is clamped to zero
    pub fn set_bottles(&mut self, bottles: Option<i64>) -> Result<(), FormError> {
        if !self.fields.bottles_enabled {
            return Err(FormError::FieldDisabled { row: self.id, field: "bottles" });
        }
        self.bottles = bottles.map(|b| b.max(0));
        Ok(())
    }

    /// Set the case count; negative input is clamped to zero
    pub fn set_cases(&mut self, cases: Option<f64>) -> Result<(), FormError> {
        if !self.fields.cases_enabled {
            return Err(FormError::FieldDisabled { row: self.id, field: "cases" });
        }
        self.cases = cases.map(|c| if c.is_nan() || c < 0.0 { 0.0 } else { c });
        Ok(())
    }

    /// Selected product with at least one quantity entered
    pub fn is_filled(&self) -> bool {
        self.selected().is_some() && (self.bottles.is_some() || self.cases.is_some())
    }

    /// Request item for a filled row; empty quantities are sent as zero
    pub fn to_request_item(&self) -> Option<RequestItem> {
        if !self.is_filled() {
            return None;
        }
        let variant = self.selected()?;

        Some(RequestItem {
            product: self.product_text.clone(),
            product_id: Some(variant.product_variant_id.to_string()),
            sku: Some(self.sku.clone()),
            volume: variant.volume_ml.and_then(|v| u32::try_from(v).ok()),
            bottles: Some(self.bottles.unwrap_or(0)),
            cases: Some(self.cases.unwrap_or(0.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i64, title: &str, volume: Option<i32>) -> ProductVariant {
        ProductVariant {
            product_variant_id: id,
            product_title: title.to_string(),
            variant_title: Some("2020".to_string()),
            volume_ml: volume,
            sku: Some(format!("SKU-{}", id)),
            sub_title: None,
        }
    }

    #[test]
    fn test_new_row_is_empty_with_both_fields_enabled() {
        let row = LineItemRow::new(RowId(1));
        assert_eq!(row.state(), &RowState::Empty);
        assert_eq!(row.fields(), FieldState::default());
        assert!(row.pending_search().is_none());
    }

    #[test]
    fn test_short_query_does_not_schedule_search() {
        let mut row = LineItemRow::new(RowId(1));
        row.type_product("P", Instant::now());

        assert_eq!(row.state(), &RowState::Searching);
        assert!(row.pending_search().is_none());
    }

    #[test]
    fn test_search_is_debounced() {
        let start = Instant::now();
        let mut row = LineItemRow::new(RowId(1));
        row.type_product("Pi", start);

        assert!(row.take_due_search(start + Duration::from_millis(299)).is_none());
        let ticket = row.take_due_search(start + SEARCH_DEBOUNCE).unwrap();
        assert_eq!(ticket.query, "Pi");
        assert_eq!(ticket.row, RowId(1));

        // Taken tickets are not handed out twice
        assert!(row.take_due_search(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_retyping_reschedules() {
        let start = Instant::now();
        let mut row = LineItemRow::new(RowId(1));
        row.type_product("Pi", start);
        row.type_product("Pin", start + Duration::from_millis(200));

        assert!(row.take_due_search(start + Duration::from_millis(300)).is_none());
        let ticket = row.take_due_search(start + Duration::from_millis(500)).unwrap();
        assert_eq!(ticket.query, "Pin");
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let start = Instant::now();
        let mut row = LineItemRow::new(RowId(1));
        row.type_product("Pi", start);
        let old = row.take_due_search(start + SEARCH_DEBOUNCE).unwrap();

        row.type_product("Pinot", start + Duration::from_millis(400));
        let new = row.take_due_search(start + Duration::from_millis(700)).unwrap();
        assert!(new.seq > old.seq);

        assert!(row.apply_results(new.seq, vec![variant(2, "Pinot Noir", Some(750))]));
        assert!(!row.apply_results(old.seq, vec![variant(1, "Pinot Gris", Some(750))]));
        assert_eq!(row.results()[0].product_title, "Pinot Noir");
    }

    #[test]
    fn test_focus_searches_immediately() {
        let mut row = LineItemRow::new(RowId(3));
        assert!(row.focus_product().is_none());

        row.type_product("Cab", Instant::now());
        let ticket = row.focus_product().unwrap();
        assert_eq!(ticket.query, "Cab");
        assert!(row.pending_search().is_none());
    }

    #[test]
    fn test_select_standard_volume_keeps_both_fields() {
        let mut row = LineItemRow::new(RowId(1));
        row.set_cases(Some(2.0)).unwrap();
        row.select(variant(7, "Pinot Noir", Some(1500)));

        assert_eq!(row.product_text(), "Pinot Noir - 2020");
        assert_eq!(row.sku(), "SKU-7");
        assert_eq!(row.fields(), FieldState::default());
        assert_eq!(row.cases(), Some(2.0));
    }

    #[test]
    fn test_select_other_volume_disables_and_clears_cases() {
        let mut row = LineItemRow::new(RowId(1));
        row.set_cases(Some(2.0)).unwrap();
        row.select(variant(8, "Late Harvest", Some(375)));

        assert!(row.fields().bottles_enabled);
        assert!(!row.fields().cases_enabled);
        assert_eq!(row.cases(), None);
        assert!(matches!(
            row.set_cases(Some(1.0)),
            Err(FormError::FieldDisabled { field: "cases", .. })
        ));
    }

    #[test]
    fn test_select_unknown_volume_leaves_fields_alone() {
        let mut row = LineItemRow::new(RowId(1));
        row.select(variant(8, "Late Harvest", Some(375)));
        row.select(variant(9, "Mystery", None));
        assert!(!row.fields().cases_enabled);
    }

    #[test]
    fn test_clearing_product_resets_row() {
        let mut row = LineItemRow::new(RowId(1));
        row.select(variant(8, "Late Harvest", Some(375)));
        row.set_bottles(Some(4)).unwrap();

        row.type_product("   ", Instant::now());
        assert_eq!(row.state(), &RowState::Empty);
        assert_eq!(row.sku(), "");
        assert_eq!(row.bottles(), None);
        assert_eq!(row.fields(), FieldState::default());
    }

    #[test]
    fn test_editing_selected_title_abandons_selection() {
        let mut row = LineItemRow::new(RowId(1));
        row.select(variant(8, "Late Harvest", Some(750)));
        row.set_bottles(Some(3)).unwrap();
        row.type_product("Late Harv", Instant::now());

        assert_eq!(row.state(), &RowState::Searching);
        assert_eq!(row.sku(), "");
        assert!(!row.is_filled());
    }

    #[test]
    fn test_negative_quantities_clamp_to_zero() {
        let mut row = LineItemRow::new(RowId(1));
        row.set_bottles(Some(-3)).unwrap();
        row.set_cases(Some(-1.5)).unwrap();
        assert_eq!(row.bottles(), Some(0));
        assert_eq!(row.cases(), Some(0.0));
    }

    #[test]
    fn test_request_item_sends_zero_for_empty_unit() {
        let mut row = LineItemRow::new(RowId(1));
        row.select(variant(5, "Widget", Some(750)));
        assert!(row.to_request_item().is_none());

        row.set_bottles(Some(5)).unwrap();
        let item = row.to_request_item().unwrap();
        assert_eq!(item.product, "Widget - 2020");
        assert_eq!(item.product_id.as_deref(), Some("5"));
        assert_eq!(item.volume, Some(750));
        assert_eq!(item.bottles, Some(5));
        assert_eq!(item.cases, Some(0.0));
    }

    #[test]
    fn test_select_result_out_of_range() {
        let mut row = LineItemRow::new(RowId(2));
        assert!(matches!(
            row.select_result(0),
            Err(FormError::NoSuchResult { index: 0, .. })
        ));
    }
}
