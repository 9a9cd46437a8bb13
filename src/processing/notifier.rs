//! Outbound email notifications.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::models::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers a plain-text message. Failures are reported, never raised.
pub trait Notifier: Send + Sync {
    /// Returns `true` when the message was handed to the relay.
    fn notify(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Sends mail through an authenticated STARTTLS relay. No retries.
pub struct SmtpNotifier {
    sender: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifierError> {
        let sender = config.sender.parse::<Mailbox>()?;
        let transport = SmtpTransport::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { sender, transport })
    }

    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message = build_message(&self.sender, to, subject, body)?;
        self.transport.send(&message)?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.send(to, subject, body) {
            Ok(()) => {
                log::info!("Sent notification to {to}");
                true
            }
            Err(error) => {
                log::error!("Failed to send notification to {to}: {error}");
                false
            }
        }
    }
}

fn build_message(
    sender: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, NotifierError> {
    let recipient = to.trim().parse::<Mailbox>()?;

    Ok(Message::builder()
        .from(sender.clone())
        .to(recipient)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?)
}

#[cfg(test)]
mod tests {
    use lettre::message::Mailbox;

    use super::{NotifierError, build_message};

    fn sender() -> Mailbox {
        "hello@example.com".parse().expect("valid sender")
    }

    #[test]
    fn build_message_addresses_recipient() {
        let message = build_message(&sender(), "owner@example.com", "Match", "Found it")
            .expect("message should build");

        let raw = String::from_utf8(message.formatted()).expect("utf-8 message");
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Subject: Match"));
        assert!(raw.contains("Found it"));
    }

    #[test]
    fn build_message_rejects_malformed_recipient() {
        let result = build_message(&sender(), "not an address", "Match", "Found it");

        assert!(matches!(result, Err(NotifierError::Address(_))));
    }
}
