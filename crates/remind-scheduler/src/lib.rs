//! Appointment scheduling core for Remind.
//!
//! This crate owns the appointment lifecycle:
//! - `schedule` stores a pending appointment and registers its reminder
//! - the firing loop fires the reminder at the appointment time, then a
//!   follow-up two minutes later
//! - `cancel` removes whichever job is still pending
//!
//! The job registry is in-memory only; nothing survives a restart.

mod error;
mod scheduler;
mod types;
pub mod validate;

pub use error::SchedulerError;
pub use scheduler::{AppointmentScheduler, ScheduleRequest};
pub use types::{
    Appointment, AppointmentStatus, Contact, FOLLOW_UP_DELAY_SECS, JobKind, ScheduledJob,
};
