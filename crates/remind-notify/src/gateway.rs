//! Channel-dispatching notification gateway.

use tracing::debug;

use crate::{EmailSender, SmsSender};

/// Front door for all outbound notifications.
///
/// Holds whichever channel senders were configured at process start;
/// sends on an unconfigured channel return false without attempting
/// delivery.
pub struct Notifier {
    email: Option<EmailSender>,
    sms: Option<SmsSender>,
}

impl Notifier {
    /// Create a gateway from the channels configured at startup.
    pub fn new(email: Option<EmailSender>, sms: Option<SmsSender>) -> Self {
        Self { email, sms }
    }

    /// A gateway with no configured channels. Every send reports false.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Whether mail credentials were configured.
    pub fn email_configured(&self) -> bool {
        self.email.is_some()
    }

    /// Whether the SMS transport was configured.
    pub fn sms_enabled(&self) -> bool {
        self.sms.is_some()
    }

    /// Send an HTML email, reporting acceptance as a boolean.
    pub async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> bool {
        match &self.email {
            Some(sender) => sender.send(to, subject, html_body).await,
            None => {
                debug!(to, "email not configured, skipping");
                false
            }
        }
    }

    /// Send an SMS, reporting acceptance as a boolean.
    pub async fn send_sms(&self, to: &str, body: &str) -> bool {
        match &self.sms {
            Some(sender) => sender.send(to, body).await,
            None => {
                debug!(to, "SMS not configured, skipping");
                false
            }
        }
    }
}
