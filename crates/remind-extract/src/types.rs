//! Extraction result types.

use serde::{Deserialize, Serialize};

/// Structured result of extracting appointment fields from free text.
///
/// Mirrors the JSON schema the model is asked to produce, so a raw model
/// response deserializes directly into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Date in `YYYY-MM-DD` format.
    pub date: Option<String>,
    /// Time in `HH:MM` (24-hour) format.
    pub time: Option<String>,
    /// Appointment subject/title.
    pub subject: Option<String>,
    /// Model confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Required fields the model could not extract.
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// Question to ask the user when extraction is incomplete.
    #[serde(default)]
    pub clarification_needed: Option<String>,
    /// Error message when extraction failed outright.
    #[serde(default)]
    pub error: Option<String>,
}

impl Extraction {
    /// An extraction that failed before or during the model call.
    pub fn failed(error: impl Into<String>, clarification: impl Into<String>) -> Self {
        Self {
            confidence: 0.0,
            error: Some(error.into()),
            clarification_needed: Some(clarification.into()),
            ..Self::default()
        }
    }

    /// Whether the extraction is complete enough to schedule from.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.missing_fields.is_empty()
    }

    /// Normalize a raw model response: verify the date shape and record
    /// every absent required field in `missing_fields`.
    pub fn normalize(mut self) -> Self {
        if let Some(date) = &self.date
            && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err()
        {
            self.error = Some("Invalid date format".to_string());
            self.push_missing("date");
        }

        if self.date.is_none() {
            self.push_missing("date");
        }
        if self.time.is_none() {
            self.push_missing("time");
        }
        if self.subject.is_none() {
            self.push_missing("subject");
        }

        self
    }

    fn push_missing(&mut self, field: &str) {
        if !self.missing_fields.iter().any(|f| f == field) {
            self.missing_fields.push(field.to_string());
        }
    }
}
