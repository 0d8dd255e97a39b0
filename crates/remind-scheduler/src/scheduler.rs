//! Appointment lifecycle and job registry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, RwLock, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use remind_notify::{Notifier, message};

use crate::{
    Appointment, AppointmentStatus, Contact, JobKind, ScheduledJob, SchedulerError,
};

/// Minimum sleep duration between firing-loop checks.
const MIN_SLEEP_SECS: u64 = 1;

/// Maximum sleep duration between firing-loop checks.
const MAX_SLEEP_SECS: u64 = 60;

/// Payload for scheduling a new appointment.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub subject: String,
    pub scheduled_at: DateTime<Utc>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Owns the appointment table and the job registry.
///
/// The registry maps each appointment id to its single pending job: a
/// `Reminder` until it fires, then (when a contact channel exists) a
/// `FollowUp`. Claiming a due job, transitioning the appointment, and
/// registering the successor job all happen under one write-lock
/// acquisition, so a concurrent cancel either removes the job before it
/// fires or observes it already claimed and reports `NotFound`.
pub struct AppointmentScheduler {
    state: RwLock<SchedulerState>,
    notifier: Arc<Notifier>,
    /// Wakes the firing loop when the registry changes.
    wake: Notify,
}

#[derive(Default)]
struct SchedulerState {
    appointments: HashMap<Uuid, Appointment>,
    jobs: HashMap<Uuid, ScheduledJob>,
}

/// Everything a claimed fire needs to deliver its notifications, captured
/// before the registry lock is released.
struct FirePlan {
    kind: JobKind,
    subject: String,
    scheduled_at: DateTime<Utc>,
    contact: Contact,
}

impl AppointmentScheduler {
    /// Create a scheduler that delivers through the given gateway.
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self {
            state: RwLock::new(SchedulerState::default()),
            notifier,
            wake: Notify::new(),
        }
    }

    /// Schedule a new appointment.
    ///
    /// Stores the appointment as `Pending`, registers its reminder job,
    /// and sends a best-effort confirmation on each provided channel.
    /// Confirmation failures are logged and never fail the call.
    #[tracing::instrument(skip(self, request), fields(subject = %request.subject))]
    pub async fn schedule(&self, request: ScheduleRequest) -> Result<Uuid, SchedulerError> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(SchedulerError::Validation(
                "Subject is required".to_string(),
            ));
        }
        if request.scheduled_at <= Utc::now() {
            return Err(SchedulerError::Validation(
                "Appointment time must be in the future".to_string(),
            ));
        }

        let appointment = Appointment::new(
            subject.to_string(),
            request.scheduled_at,
            Contact {
                email: request.email,
                phone: request.phone,
            },
        );
        let id = appointment.id;
        let scheduled_at = appointment.scheduled_at;
        let contact = appointment.contact.clone();
        let subject = appointment.subject.clone();

        {
            let mut state = self.state.write().await;
            if state.jobs.contains_key(&id) {
                return Err(SchedulerError::JobExists(id));
            }
            state.jobs.insert(id, ScheduledJob::reminder(scheduled_at));
            state.appointments.insert(id, appointment);
        }
        self.wake.notify_one();
        info!(%id, %scheduled_at, subject = %subject, "scheduled appointment");

        if let Some(email) = &contact.email {
            let (subject_line, html) = message::confirmation_email(&subject, scheduled_at);
            self.notifier.send_email(email, &subject_line, &html).await;
        }
        if let Some(phone) = &contact.phone {
            self.notifier
                .send_sms(phone, &message::confirmation_sms(&subject, scheduled_at))
                .await;
        }

        Ok(id)
    }

    /// Fire the reminder for an appointment.
    ///
    /// Atomically consumes the `Reminder` entry, transitions the
    /// appointment to `ReminderFired`, and registers the `FollowUp` job
    /// when at least one contact channel exists. Notifications go out per
    /// channel after the registry settles; a failure on one channel never
    /// blocks the other.
    #[tracing::instrument(skip(self))]
    pub async fn fire_reminder(&self, id: Uuid) -> Result<(), SchedulerError> {
        let plan = self.claim(id, JobKind::Reminder).await?;
        info!(%id, subject = %plan.subject, "firing reminder");
        self.deliver(&plan).await;
        Ok(())
    }

    /// Fire the follow-up for an appointment.
    ///
    /// Atomically consumes the `FollowUp` entry and transitions the
    /// appointment to `FollowUpFired`, then asks on each channel whether
    /// the appointment was attended.
    #[tracing::instrument(skip(self))]
    pub async fn fire_follow_up(&self, id: Uuid) -> Result<(), SchedulerError> {
        let plan = self.claim(id, JobKind::FollowUp).await?;
        info!(%id, subject = %plan.subject, "firing follow-up");
        self.deliver(&plan).await;
        Ok(())
    }

    /// Cancel an appointment's pending job and mark it `Cancelled`.
    ///
    /// Returns `NotFound` when no pending job exists for the id: the
    /// appointment never existed, already ran to completion, or was
    /// already cancelled.
    pub async fn cancel(&self, id: Uuid) -> Result<(), SchedulerError> {
        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            if state.jobs.remove(&id).is_none() {
                return Err(SchedulerError::NotFound(id));
            }
            if let Some(appointment) = state.appointments.get_mut(&id) {
                appointment.status = AppointmentStatus::Cancelled;
            }
        }
        self.wake.notify_one();
        info!(%id, "cancelled appointment");
        Ok(())
    }

    /// Get an appointment by id.
    pub async fn get(&self, id: Uuid) -> Option<Appointment> {
        self.state.read().await.appointments.get(&id).cloned()
    }

    /// List all known appointments.
    pub async fn list(&self) -> Vec<Appointment> {
        self.state.read().await.appointments.values().cloned().collect()
    }

    /// Get the pending job for an appointment, if any.
    pub async fn pending_job(&self, id: Uuid) -> Option<ScheduledJob> {
        self.state.read().await.jobs.get(&id).copied()
    }

    /// Number of jobs currently pending in the registry.
    pub async fn pending_job_count(&self) -> usize {
        self.state.read().await.jobs.len()
    }

    /// Run the firing loop until shutdown.
    ///
    /// Each due job fires on its own spawned task so one slow notification
    /// transport never delays other appointments. The loop sleeps until
    /// the next job is due, waking early on registry changes.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        info!("firing loop starting");

        loop {
            if *shutdown_rx.borrow() {
                info!("firing loop shutting down");
                break;
            }

            for (id, kind) in self.due_jobs().await {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    let result = match kind {
                        JobKind::Reminder => scheduler.fire_reminder(id).await,
                        JobKind::FollowUp => scheduler.fire_follow_up(id).await,
                    };
                    // Losing the race against a cancel is expected.
                    if let Err(SchedulerError::NotFound(_)) = result {
                        debug!(%id, "job vanished before firing");
                    } else if let Err(e) = result {
                        warn!(%id, error = %e, "job fire failed");
                    }
                });
            }

            let sleep_duration = self.sleep_duration().await;
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                _ = self.wake.notified() => {}
                _ = sleep(sleep_duration) => {}
            }
        }

        info!("firing loop shut down gracefully");
    }

    /// Atomically claim a due job of the expected kind.
    ///
    /// Removes the entry, applies the status transition, and (for a
    /// reminder with a contact channel) registers the follow-up — all
    /// under one write-lock acquisition.
    async fn claim(&self, id: Uuid, expected: JobKind) -> Result<FirePlan, SchedulerError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        match state.jobs.get(&id) {
            Some(job) if job.kind == expected => {}
            _ => return Err(SchedulerError::NotFound(id)),
        }
        state.jobs.remove(&id);

        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or(SchedulerError::NotFound(id))?;

        match expected {
            JobKind::Reminder => {
                appointment.status = AppointmentStatus::ReminderFired;
                if appointment.contact.has_channel() {
                    state
                        .jobs
                        .insert(id, ScheduledJob::follow_up(appointment.scheduled_at));
                }
            }
            JobKind::FollowUp => {
                appointment.status = AppointmentStatus::FollowUpFired;
            }
        }

        let plan = FirePlan {
            kind: expected,
            subject: appointment.subject.clone(),
            scheduled_at: appointment.scheduled_at,
            contact: appointment.contact.clone(),
        };
        drop(guard);

        self.wake.notify_one();
        Ok(plan)
    }

    /// Send the notifications for a claimed fire, one channel at a time.
    async fn deliver(&self, plan: &FirePlan) {
        match plan.kind {
            JobKind::Reminder => {
                if let Some(email) = &plan.contact.email {
                    let (subject_line, html) =
                        message::reminder_email(&plan.subject, plan.scheduled_at);
                    self.notifier.send_email(email, &subject_line, &html).await;
                }
                if let Some(phone) = &plan.contact.phone {
                    self.notifier
                        .send_sms(phone, &message::reminder_sms(&plan.subject, plan.scheduled_at))
                        .await;
                }
            }
            JobKind::FollowUp => {
                if let Some(email) = &plan.contact.email {
                    let (subject_line, html) =
                        message::follow_up_email(&plan.subject, plan.scheduled_at);
                    self.notifier.send_email(email, &subject_line, &html).await;
                }
                if let Some(phone) = &plan.contact.phone {
                    self.notifier
                        .send_sms(phone, &message::follow_up_sms(&plan.subject, plan.scheduled_at))
                        .await;
                }
            }
        }
    }

    /// Jobs due right now, by id and kind.
    async fn due_jobs(&self) -> Vec<(Uuid, JobKind)> {
        let now = Utc::now();
        self.state
            .read()
            .await
            .jobs
            .iter()
            .filter(|(_, job)| job.is_due(now))
            .map(|(id, job)| (*id, job.kind))
            .collect()
    }

    /// How long to sleep until the next job is due.
    async fn sleep_duration(&self) -> std::time::Duration {
        let now = Utc::now();
        let next = self.state.read().await.jobs.values().map(|j| j.fire_at).min();

        let secs = match next {
            Some(at) => {
                let diff = (at - now).num_seconds();
                (diff.max(MIN_SLEEP_SECS as i64) as u64).min(MAX_SLEEP_SECS)
            }
            None => MAX_SLEEP_SECS,
        };

        std::time::Duration::from_secs(secs)
    }
}
