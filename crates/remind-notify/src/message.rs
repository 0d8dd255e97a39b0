//! Notification content rendering.
//!
//! All user-visible timestamps are rendered in a single fixed display
//! timezone (UTC+5:30) with a 12-hour clock.

use chrono::{DateTime, FixedOffset, Utc};

/// Display timezone offset from UTC, in seconds (UTC+5:30).
const DISPLAY_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Render a timestamp for user-facing text, e.g.
/// "Monday, March 10, 2025 at 08:30 PM".
pub fn format_display_time(at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(DISPLAY_OFFSET_SECS).expect("display offset in range");
    at.with_timezone(&offset)
        .format("%A, %B %d, %Y at %I:%M %p")
        .to_string()
}

/// Confirmation email sent when an appointment is scheduled.
///
/// Returns the subject line and the HTML body.
pub fn confirmation_email(subject: &str, at: DateTime<Utc>) -> (String, String) {
    let when = format_display_time(at);
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #6366f1;">&#9989; Appointment Confirmed</h2>
    <p>Your appointment has been successfully scheduled!</p>
    <div style="background: #f1f5f9; padding: 20px; border-radius: 10px; margin: 20px 0;">
        <h3 style="margin-top: 0; color: #334155;">Appointment Details</h3>
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Date &amp; Time:</strong> {when}</p>
    </div>
    <p>You will receive a reminder notification at the scheduled time.</p>
    <p style="color: #64748b; font-size: 14px;">- Your Appointment Bot</p>
</div>"#
    );
    (format!("Appointment Confirmed: {subject}"), html)
}

/// Confirmation SMS sent when an appointment is scheduled.
pub fn confirmation_sms(subject: &str, at: DateTime<Utc>) -> String {
    format!(
        "\u{2705} Appointment confirmed!\n\n\"{subject}\"\n{}\n\nYou'll receive a reminder at the scheduled time.",
        format_display_time(at)
    )
}

/// Reminder email fired at the appointment time.
pub fn reminder_email(subject: &str, at: DateTime<Utc>) -> (String, String) {
    let when = format_display_time(at);
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #ef4444;">&#9200; Appointment Reminder</h2>
    <p>This is your scheduled appointment reminder!</p>
    <div style="background: #fef2f2; padding: 20px; border-radius: 10px; margin: 20px 0; border-left: 4px solid #ef4444;">
        <h3 style="margin-top: 0; color: #991b1b;">Time for your appointment</h3>
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Scheduled Time:</strong> {when}</p>
    </div>
    <p style="color: #64748b; font-size: 14px;">- Your Appointment Bot</p>
</div>"#
    );
    (format!("\u{23f0} Reminder: {subject}"), html)
}

/// Reminder SMS fired at the appointment time.
pub fn reminder_sms(subject: &str, at: DateTime<Utc>) -> String {
    format!(
        "\u{23f0} APPOINTMENT REMINDER\n\n\"{subject}\"\n\nScheduled for: {}\n\nTime to get ready!",
        format_display_time(at)
    )
}

/// Follow-up email fired two minutes after the appointment time.
pub fn follow_up_email(subject: &str, at: DateTime<Utc>) -> (String, String) {
    let when = format_display_time(at);
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #dc2626;">&#9888; Appointment Follow-up</h2>
    <p>This is a follow-up for your appointment that was scheduled 2 minutes ago.</p>
    <div style="background: #fee2e2; padding: 20px; border-radius: 10px; margin: 20px 0; border-left: 4px solid #dc2626;">
        <h3 style="margin-top: 0; color: #991b1b;">Were you able to attend?</h3>
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Scheduled Time:</strong> {when}</p>
        <p style="margin-top: 15px; font-size: 14px;">If you missed this appointment, please reschedule at your earliest convenience.</p>
    </div>
    <p style="color: #64748b; font-size: 14px;">- Your Appointment Bot</p>
</div>"#
    );
    (format!("\u{26a0} Follow-up: {subject}"), html)
}

/// Follow-up SMS fired two minutes after the appointment time.
pub fn follow_up_sms(subject: &str, at: DateTime<Utc>) -> String {
    format!(
        "\u{26a0} FOLLOW-UP REMINDER\n\n\"{subject}\" was scheduled for {}.\n\nDid you attend? If you missed it, please reschedule.",
        format_display_time(at)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn display_time_renders_in_fixed_offset_12_hour_clock() {
        // 15:00 UTC is 20:30 at UTC+5:30.
        assert_eq!(
            format_display_time(utc("2025-03-10T15:00:00Z")),
            "Monday, March 10, 2025 at 08:30 PM"
        );
    }

    #[test]
    fn display_time_crosses_midnight() {
        // 20:00 UTC on the 10th is 01:30 AM on the 11th at UTC+5:30.
        assert_eq!(
            format_display_time(utc("2025-03-10T20:00:00Z")),
            "Tuesday, March 11, 2025 at 01:30 AM"
        );
    }

    #[test]
    fn reminder_email_contains_subject_and_display_time() {
        let (subject_line, html) = reminder_email("Dentist", utc("2025-03-10T15:00:00Z"));
        assert!(subject_line.contains("Dentist"));
        assert!(html.contains("Dentist"));
        assert!(html.contains("Monday, March 10, 2025 at 08:30 PM"));
    }

    #[test]
    fn reminder_sms_contains_subject_and_display_time() {
        let sms = reminder_sms("Dentist", utc("2025-03-10T15:00:00Z"));
        assert!(sms.contains("\"Dentist\""));
        assert!(sms.contains("Monday, March 10, 2025 at 08:30 PM"));
    }

    #[test]
    fn follow_up_bodies_ask_about_attendance() {
        let at = utc("2030-01-01T10:00:00Z");
        let (_, html) = follow_up_email("Standup", at);
        assert!(html.contains("Were you able to attend?"));
        assert!(follow_up_sms("Standup", at).contains("Did you attend?"));
    }

    #[test]
    fn confirmation_messages_mention_upcoming_reminder() {
        let at = utc("2030-01-01T10:00:00Z");
        let (subject_line, html) = confirmation_email("Gym", at);
        assert_eq!(subject_line, "Appointment Confirmed: Gym");
        assert!(html.contains("reminder notification"));
        assert!(confirmation_sms("Gym", at).contains("You'll receive a reminder"));
    }
}
