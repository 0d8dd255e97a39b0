//! SMTP email delivery.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use crate::NotifyError;

/// SMTP relay for outbound mail (implicit TLS, port 465).
const SMTP_HOST: &str = "smtp.gmail.com";

/// Sends HTML email through an SMTP relay with pre-shared credentials.
pub struct EmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailSender {
    /// Create a sender authenticated as the given account.
    ///
    /// The account address doubles as the `From` mailbox.
    pub fn new(user: &str, password: &str) -> Result<Self, NotifyError> {
        let from: Mailbox = format!("Appointment Bot <{user}>").parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from })
    }

    /// Send an HTML email.
    ///
    /// Returns true when the relay accepts the message. Authentication and
    /// transport failures are logged and reported as false; they never
    /// propagate past this boundary.
    pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        match self.try_send(to, subject, html_body).await {
            Ok(()) => {
                debug!(to, subject, "email sent");
                true
            }
            Err(e) => {
                warn!(to, error = %e, "failed to send email");
                false
            }
        }
    }

    async fn try_send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_construction_accepts_plain_address() {
        let sender = EmailSender::new("bot@example.com", "app-password");
        assert!(sender.is_ok());
    }

    #[test]
    fn sender_construction_rejects_invalid_address() {
        let sender = EmailSender::new("not an address", "app-password");
        assert!(sender.is_err());
    }

    #[tokio::test]
    async fn send_to_invalid_recipient_returns_false() {
        let sender = EmailSender::new("bot@example.com", "app-password").unwrap();
        // Recipient fails to parse before any network I/O happens.
        assert!(!sender.send("not an address", "subject", "<p>body</p>").await);
    }
}
