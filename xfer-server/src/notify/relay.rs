//! Mail relays
//!
//! `SmtpRelay` hands messages to the configured SMTP server. `LogRelay` only
//! logs them, for running without a mail server.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::NotifyError;

/// A fully addressed HTML email
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Delivers composed mail
///
/// Success means the relay accepted the message, not that it reached an inbox.
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Relay name for logs
    fn name(&self) -> &'static str;

    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError>;
}

/// SMTP connection settings
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Require STARTTLS; otherwise the connection is upgraded only when the
    /// server offers it
    pub starttls: bool,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("starttls", &self.starttls)
            .finish()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|source| NotifyError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

/// Convert an outgoing mail into a lettre message
pub fn build_message(mail: &OutgoingMail) -> Result<Message, NotifyError> {
    if mail.to.is_empty() {
        return Err(NotifyError::NoRecipients);
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_HTML);
    for address in &mail.to {
        builder = builder.to(parse_mailbox(address)?);
    }

    Ok(builder.body(mail.html.clone())?)
}

/// Relay through an SMTP server
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// TLS policy for the relay connection
///
/// Credentials are only ever sent after a STARTTLS upgrade when the server
/// advertises it; `starttls` makes the upgrade mandatory.
pub fn tls_policy(settings: &SmtpSettings) -> Result<Tls, NotifyError> {
    let parameters = TlsParameters::new(settings.host.clone())?;
    Ok(if settings.starttls {
        Tls::Required(parameters)
    } else {
        Tls::Opportunistic(parameters)
    })
}

impl SmtpRelay {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(tls_policy(settings)?);

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        let message = build_message(mail)?;
        let response = self.transport.send(message).await?;
        debug!("SMTP relay accepted message: {:?}", response.code());
        Ok(())
    }
}

/// Logs messages instead of sending them
#[derive(Debug, Default)]
pub struct LogRelay;

#[async_trait]
impl MailRelay for LogRelay {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        // Still validates the addresses so misconfiguration shows up in development
        build_message(mail)?;
        info!(
            to = %mail.to.join(", "),
            subject = %mail.subject,
            "Mail relay disabled; notification logged instead of sent"
        );
        debug!("Notification body:\n{}", mail.html);
        Ok(())
    }
}
