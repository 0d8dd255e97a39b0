//! Field validation for appointment payloads.
//!
//! Used at the HTTP boundary for extractor-originated payloads, where the
//! fields arrive as loose strings. Checks report the first failing reason
//! only; they do not aggregate errors.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::SchedulerError;

/// Maximum accepted length for free-text user input.
const MAX_INPUT_LEN: usize = 500;

/// Raw appointment fields as supplied by a caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFields<'a> {
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

/// Check an email address has `local@domain.tld` shape.
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Check a phone number is 10-15 digits after stripping common separators.
pub fn validate_phone(phone: &str) -> bool {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (10..=15).contains(&digits.len())
}

/// Check a date parses as `YYYY-MM-DD` and a time as `HH:MM` (24-hour).
pub fn validate_datetime(date: &str, time: &str) -> Result<(), SchedulerError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| SchedulerError::Validation(format!("Invalid date or time format: {e}")))?;
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|e| SchedulerError::Validation(format!("Invalid date or time format: {e}")))?;
    Ok(())
}

/// Validate a complete payload, reporting the first failing reason.
pub fn validate_appointment_fields(fields: &AppointmentFields<'_>) -> Result<(), SchedulerError> {
    let date = fields
        .date
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SchedulerError::Validation("Date is required".to_string()))?;
    let time = fields
        .time
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SchedulerError::Validation("Time is required".to_string()))?;
    fields
        .subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SchedulerError::Validation("Subject is required".to_string()))?;

    validate_datetime(date, time)?;

    if let Some(email) = fields.email.filter(|s| !s.is_empty())
        && !validate_email(email)
    {
        return Err(SchedulerError::Validation(
            "Invalid email format".to_string(),
        ));
    }

    if let Some(phone) = fields.phone.filter(|s| !s.is_empty())
        && !validate_phone(phone)
    {
        return Err(SchedulerError::Validation(
            "Invalid phone number format".to_string(),
        ));
    }

    Ok(())
}

/// Trim, cap, and strip markup characters from free-text user input.
pub fn sanitize_user_input(text: &str) -> String {
    let capped: String = text.trim().chars().take(MAX_INPUT_LEN).collect();
    capped.replace(['<', '>'], "")
}
