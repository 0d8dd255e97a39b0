//! Error types for the appointment scheduler.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Payload failed validation. The message is safe to surface to the
    /// caller.
    #[error("{0}")]
    Validation(String),

    /// No pending job exists for the appointment id. Covers ids that never
    /// existed, appointments that already ran to completion, and repeated
    /// cancellations.
    #[error("appointment not found: {0}")]
    NotFound(Uuid),

    /// A job is already registered for the appointment.
    #[error("job already registered for appointment: {0}")]
    JobExists(Uuid),
}
