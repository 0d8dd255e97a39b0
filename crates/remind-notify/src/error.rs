//! Error types for the notification gateway.

use thiserror::Error;

/// Errors that can occur when delivering a notification.
///
/// These never escape the gateway's public send methods, which report
/// failures as `false` after logging.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport failure (connection, TLS, authentication).
    #[error("mail transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The mail message could not be assembled.
    #[error("invalid mail message: {0}")]
    MailMessage(#[from] lettre::error::Error),

    /// A mailbox address failed to parse.
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// HTTP request to the SMS provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The SMS provider rejected the message.
    #[error("SMS provider error ({status}): {body}")]
    SmsRejected { status: u16, body: String },
}
