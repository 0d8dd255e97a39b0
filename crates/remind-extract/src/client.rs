//! Gemini-backed extraction client.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use chrono::Local;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::{ExtractError, Extraction};

/// Gemini API origin. Overridable for tests.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used for extraction.
const MODEL: &str = "gemini-3-flash-preview";

/// Consecutive failed model calls before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Client converting free text into structured appointment fields.
pub struct Extractor {
    http: Client,
    api_base: String,
    api_key: String,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Extractor {
    /// Create a client for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_base: GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }

    /// Override the API origin (used by tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Extract appointment fields from a natural-language message.
    ///
    /// Transient API failures retry with exponential backoff; after
    /// `MAX_ATTEMPTS` consecutive failures the result is an error
    /// extraction carrying a clarification prompt. This method never
    /// returns an error to the caller.
    pub async fn extract(&self, message: &str) -> Extraction {
        if message.trim().len() < 3 {
            return Extraction::failed(
                "Message too short",
                "Please describe your appointment (e.g., 'Dentist tomorrow at 3pm')",
            );
        }

        match self.call_with_retry(message).await {
            Ok(extraction) => {
                let extraction = extraction.normalize();
                debug!(
                    confidence = extraction.confidence,
                    missing = ?extraction.missing_fields,
                    "extraction complete"
                );
                extraction
            }
            Err(e) => {
                warn!(error = %e, "extraction failed after retries");
                Extraction::failed(
                    format!("LLM service error: {e}"),
                    "I'm having trouble understanding. Could you please rephrase using format: \
                     'Subject on Date at Time'?",
                )
            }
        }
    }

    async fn call_with_retry(&self, message: &str) -> Result<Extraction, ExtractError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        backoff::future::retry(policy, || async {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            self.call_model(message).await.map_err(|e| {
                if attempt >= MAX_ATTEMPTS {
                    backoff::Error::permanent(e)
                } else {
                    warn!(attempt, error = %e, "model call failed, retrying");
                    backoff::Error::transient(e)
                }
            })
        })
        .await
    }

    async fn call_model(&self, message: &str) -> Result<Extraction, ExtractError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, MODEL, self.api_key
        );
        let prompt = format!(
            "{}\n\nUser message: \"{message}\"\n\nExtract appointment details and respond with valid JSON only:",
            system_prompt()
        );

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": 0.1,
                    "responseMimeType": "application/json"
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api { status, body });
        }

        let body: serde_json::Value = response.json().await?;
        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExtractError::InvalidResponse("missing candidate text".to_string()))?;

        let extraction: Extraction = serde_json::from_str(strip_code_fences(text))?;
        Ok(extraction)
    }
}

/// Build the extraction prompt, anchored to today's date so the model can
/// resolve relative expressions like "tomorrow" or "next Monday".
fn system_prompt() -> String {
    let today = Local::now();
    let tomorrow = today + chrono::Duration::days(1);

    format!(
        r#"You are an appointment scheduling assistant. Extract appointment details from natural, casual user messages.

Current date and time: {now_long}
Current date: {today}

RULES:
1. Accept any date - past, present, or future. Never reject a date.
2. Parse relative dates: "tomorrow", "today", "next Monday", "in 2 days", etc.
3. Parse times in any format: "3pm" -> "15:00", "12pm" -> "12:00", "10:30am" -> "10:30", "noon" -> "12:00"
4. Extract the subject from ANY part of the message, including nouns, activities, or keywords like "dentist", "meeting with John", "gym", "doctor"
5. Word order does NOT matter - "tomorrow 12pm meeting for dentist" means date:tomorrow, time:12pm, subject:Dentist appointment
6. If the date, time, or subject is missing, ask for clarification
7. Be lenient and intelligent - try your best to extract something useful

Return ONLY valid JSON matching this schema:
{{
    "date": "YYYY-MM-DD or null",
    "time": "HH:MM or null",
    "subject": "appointment subject or null",
    "confidence": 0.0-1.0,
    "missing_fields": ["field1", "field2"],
    "clarification_needed": "question to ask user or null",
    "error": "error message or null"
}}

Examples:
- "tomorrow 12pm meeting for dentist" -> {{"date": "{tomorrow}", "time": "12:00", "subject": "Dentist appointment", "confidence": 0.95, "missing_fields": [], "clarification_needed": null}}
- "today 5:47pm meeting" -> {{"date": "{today}", "time": "17:47", "subject": "Meeting", "confidence": 0.9, "missing_fields": [], "clarification_needed": null}}
- "meeting next Monday" -> {{"date": "[next Monday's date]", "time": null, "subject": "Meeting", "confidence": 0.7, "missing_fields": ["time"], "clarification_needed": "What time is the meeting?"}}"#,
        now_long = today.format("%A, %B %d, %Y at %I:%M %p"),
        today = today.format("%Y-%m-%d"),
        tomorrow = tomorrow.format("%Y-%m-%d"),
    )
}

/// Strip a markdown code fence wrapper, which some models emit even when
/// asked for raw JSON.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end_matches('`').trim()
}

#[cfg(test)]
impl Extractor {
    fn with_fast_retry(mut self) -> Self {
        self.initial_backoff = Duration::from_millis(10);
        self.max_backoff = Duration::from_millis(20);
        self
    }
}
