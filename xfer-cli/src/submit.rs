//! Filling and submitting a transfer form from the command line
//!
//! The command-line items are entered into a `FormSession` the same way a
//! person would use the web form: pick a product (by SKU from the loaded
//! catalog, or by search), enter quantities, then submit once the session
//! validates.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};
use xfer_common::form::{FormError, RowId, SEARCH_DEBOUNCE};
use xfer_common::models::TransferResponse;
use xfer_common::{FormSession, ValidationError};

use crate::client::{ClientError, TransferClient};
use crate::items::ItemSpec;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No product matches {0:?}")]
    NoMatch(String),

    #[error("Search text {0:?} is too short")]
    QueryTooShort(String),
}

/// Everything `xfer submit` was given
#[derive(Debug, Clone, Default)]
pub struct TransferDraft {
    pub from: String,
    pub to: String,
    pub items: Vec<ItemSpec>,
    pub notes: Option<String>,
    pub authorized_by: Option<String>,
}

/// Enter the draft into a session whose catalog is already loaded
pub async fn fill_session(
    client: &TransferClient,
    session: &mut FormSession,
    draft: &TransferDraft,
) -> Result<(), SubmitError> {
    session.from_location().choose(&draft.from);
    session.to_location().choose(&draft.to);
    if let Some(notes) = &draft.notes {
        session.set_notes(notes);
    }
    if let Some(name) = &draft.authorized_by {
        session.set_authorized_by(name);
    }

    for (i, item) in draft.items.iter().enumerate() {
        // The session starts with one empty row for the first item
        let existing = if i == 0 { session.rows().first().map(|r| r.id()) } else { None };
        let row = match existing {
            Some(id) => id,
            None => session.add_row(),
        };

        if session.find_by_sku(&item.product).is_some() {
            session.select_by_sku(row, &item.product)?;
        } else {
            select_by_search(client, session, row, &item.product).await?;
        }

        if item.bottles.is_some() {
            session.set_bottles(row, item.bottles)?;
        }
        if item.cases.is_some() {
            session.set_cases(row, item.cases)?;
        }
    }

    Ok(())
}

/// Type the query into the row, run the search it schedules, take the top hit
async fn select_by_search(
    client: &TransferClient,
    session: &mut FormSession,
    row: RowId,
    query: &str,
) -> Result<(), SubmitError> {
    let now = Instant::now();
    session.type_product(row, query, now)?;

    let tickets = session.due_searches(now + SEARCH_DEBOUNCE);
    let Some(ticket) = tickets.into_iter().find(|t| t.row == row) else {
        return Err(SubmitError::QueryTooShort(query.to_string()));
    };

    let results = client.search(&ticket.query).await?;
    debug!("Search {:?} returned {} candidates", ticket.query, results.len());
    if results.is_empty() || !session.apply_search_results(&ticket, results) {
        return Err(SubmitError::NoMatch(query.to_string()));
    }

    session.select_result(row, 0)?;
    info!("{} -> {}", query, session.row(row)?.product_text());
    Ok(())
}

/// Load the catalog, fill a fresh session and post it
pub async fn submit_draft(client: &TransferClient, draft: &TransferDraft) -> Result<TransferResponse, SubmitError> {
    let catalog = client.list_products().await?;
    debug!("Loaded {} products", catalog.len());

    let mut session = FormSession::with_catalog(catalog);
    fill_session(client, &mut session, draft).await?;

    let request = session.submit()?;
    Ok(client.submit(&request).await?)
}
