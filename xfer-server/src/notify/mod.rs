//! Transfer notification email
//!
//! Renders the transfer document as HTML, works out who receives it, and
//! hands it to the mail relay. Delivery is attempted once; a failure is
//! returned to the caller and the document is dropped.

pub mod html;
pub mod relay;
pub mod routing;

pub use relay::{LogRelay, MailRelay, OutgoingMail, SmtpRelay, SmtpSettings};
pub use routing::{RecipientRoute, RecipientRouter};

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use xfer_common::TransferDocument;

/// Notification delivery failure
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid email address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Notification has no recipients")]
    NoRecipients,

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Mail relay error: {0}")]
    Relay(String),
}

/// Sends transfer notifications
pub struct Notifier {
    relay: Arc<dyn MailRelay>,
    router: RecipientRouter,
    sender: String,
}

impl Notifier {
    pub fn new(relay: Arc<dyn MailRelay>, router: RecipientRouter, sender: impl Into<String>) -> Self {
        Self {
            relay,
            router,
            sender: sender.into(),
        }
    }

    pub fn router(&self) -> &RecipientRouter {
        &self.router
    }

    pub fn relay_name(&self) -> &'static str {
        self.relay.name()
    }

    /// Address, subject and render the email for a document
    pub fn compose_mail(&self, doc: &TransferDocument) -> OutgoingMail {
        OutgoingMail {
            from: self.sender.clone(),
            to: self.router.recipients(&doc.transfer_from, &doc.transfer_to),
            subject: format!("Inventory Transfer Request - {}", doc.transfer_id),
            html: html::render_transfer_html(doc),
        }
    }

    /// Compose and deliver; returns the recipient list on success
    pub async fn send_transfer(&self, doc: &TransferDocument) -> Result<Vec<String>, NotifyError> {
        let mail = self.compose_mail(doc);
        self.relay.send(&mail).await?;
        info!(
            transfer_id = %doc.transfer_id,
            relay = self.relay.name(),
            recipients = mail.to.len(),
            "Transfer email sent successfully"
        );
        Ok(mail.to)
    }
}
