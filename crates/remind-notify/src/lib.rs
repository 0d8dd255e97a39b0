//! Notification gateway for Remind.
//!
//! This crate delivers user-facing notifications over two channels:
//! - Email via an SMTP relay (lettre)
//! - SMS via the Twilio REST API (reqwest)
//!
//! Both channels are fire-and-forget from the scheduler's perspective:
//! delivery results surface as booleans for logging and tests, and no
//! transport error ever crosses this crate's boundary.

mod email;
mod error;
mod gateway;
pub mod message;
mod sms;

pub use email::EmailSender;
pub use error::NotifyError;
pub use gateway::Notifier;
pub use sms::SmsSender;
