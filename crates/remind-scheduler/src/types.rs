//! Scheduler types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds between an appointment's reminder and its follow-up.
pub const FOLLOW_UP_DELAY_SECS: i64 = 120;

/// Contact channels for an appointment.
///
/// Both channels are independently optional; an appointment with neither
/// is valid and simply produces no notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    /// Whether at least one channel is available.
    pub fn has_channel(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

/// A scheduled appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Opaque unique identifier, allocated at creation.
    pub id: Uuid,
    /// What the appointment is about.
    pub subject: String,
    /// When the appointment happens (and the reminder fires).
    pub scheduled_at: DateTime<Utc>,
    /// Notification channels.
    pub contact: Contact,
    /// Current lifecycle status.
    pub status: AppointmentStatus,
    /// When this appointment was created.
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a new pending appointment with a fresh id.
    pub fn new(subject: String, scheduled_at: DateTime<Utc>, contact: Contact) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            scheduled_at,
            contact,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle status of an appointment.
///
/// Transitions only move forward:
///
/// ```text
/// Pending -> ReminderFired -> FollowUpFired
/// Pending -> Cancelled
/// ReminderFired -> Cancelled
/// ```
///
/// `FollowUpFired` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Waiting for the reminder to fire.
    #[default]
    Pending,
    /// Reminder delivered; follow-up may still be pending.
    ReminderFired,
    /// Follow-up delivered; nothing left to do.
    FollowUpFired,
    /// Cancelled before the lifecycle completed.
    Cancelled,
}

impl AppointmentStatus {
    /// Whether a cancel request is permitted in this state.
    pub fn cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::ReminderFired)
    }

    /// Whether no further transition can leave this state.
    pub fn terminal(&self) -> bool {
        matches!(self, Self::FollowUpFired | Self::Cancelled)
    }
}

/// Which action a pending job performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Fires at the appointment time.
    Reminder,
    /// Fires two minutes after the appointment time.
    FollowUp,
}

/// A registry entry: the single live job for one appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub kind: JobKind,
    pub fire_at: DateTime<Utc>,
}

impl ScheduledJob {
    /// The reminder job for an appointment at `scheduled_at`.
    pub fn reminder(scheduled_at: DateTime<Utc>) -> Self {
        Self {
            kind: JobKind::Reminder,
            fire_at: scheduled_at,
        }
    }

    /// The follow-up job for an appointment at `scheduled_at`.
    pub fn follow_up(scheduled_at: DateTime<Utc>) -> Self {
        Self {
            kind: JobKind::FollowUp,
            fire_at: scheduled_at + Duration::seconds(FOLLOW_UP_DELAY_SECS),
        }
    }

    /// Whether this job is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_at <= now
    }
}
