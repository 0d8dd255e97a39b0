//! SMS delivery via the Twilio REST API.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::NotifyError;

/// Twilio API origin. Overridable for tests.
const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Sends SMS messages through a Twilio account.
pub struct SmsSender {
    http: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsSender {
    /// Create a sender for the given Twilio account and sender number.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_base: TWILIO_API_BASE.to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        }
    }

    /// Override the API origin (used by tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Send an SMS.
    ///
    /// Returns true when the provider accepts the message; provider and
    /// transport failures are logged and reported as false.
    pub async fn send(&self, to: &str, body: &str) -> bool {
        match self.try_send(to, body).await {
            Ok(()) => {
                debug!(to, "SMS sent");
                true
            }
            Err(e) => {
                warn!(to, error = %e, "failed to send SMS");
                false
            }
        }
    }

    async fn try_send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::SmsRejected { status, body });
        }

        Ok(())
    }
}
