//! API routes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router, extract::Path, extract::State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use remind_extract::Extractor;
use remind_notify::Notifier;
use remind_scheduler::{AppointmentScheduler, ScheduleRequest, validate};

use crate::ApiError;

/// Shared state for the API server.
pub struct AppState {
    pub scheduler: Arc<AppointmentScheduler>,
    pub notifier: Arc<Notifier>,
    /// Present only when an API key was configured at startup.
    pub extractor: Option<Arc<Extractor>>,
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/parse-message", post(parse_message))
        .route("/api/appointments/schedule", post(schedule_appointment))
        .route("/api/appointments/{id}", delete(cancel_appointment))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "email_configured": state.notifier.email_configured(),
        "sms_enabled": state.notifier.sms_enabled(),
        "llm_enabled": state.extractor.is_some(),
    }))
}

#[derive(Deserialize)]
struct ParseMessageBody {
    #[serde(default)]
    message: String,
}

async fn parse_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParseMessageBody>,
) -> Response {
    let Some(extractor) = &state.extractor else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "Natural language processing not available",
                "fallback_to_form": true,
            })),
        )
            .into_response();
    };

    let message = validate::sanitize_user_input(&body.message);
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Message is required",
            })),
        )
            .into_response();
    }

    let extraction = extractor.extract(&message).await;

    if let Some(error) = &extraction.error {
        return Json(json!({
            "success": false,
            "extraction": &extraction,
            "clarification_needed": &extraction.clarification_needed,
            "error": error,
        }))
        .into_response();
    }

    if !extraction.missing_fields.is_empty() {
        let clarification = extraction.clarification_needed.clone().unwrap_or_else(|| {
            format!("Please provide: {}", extraction.missing_fields.join(", "))
        });
        return Json(json!({
            "success": false,
            "extraction": &extraction,
            "clarification_needed": clarification,
            "missing_fields": &extraction.missing_fields,
        }))
        .into_response();
    }

    let fields = validate::AppointmentFields {
        date: extraction.date.as_deref(),
        time: extraction.time.as_deref(),
        subject: extraction.subject.as_deref(),
        email: None,
        phone: None,
    };
    if let Err(e) = validate::validate_appointment_fields(&fields) {
        let reason = e.to_string();
        return Json(json!({
            "success": false,
            "extraction": &extraction,
            "error": &reason,
            "clarification_needed": format!("There's an issue: {reason}"),
        }))
        .into_response();
    }

    info!(
        subject = ?extraction.subject,
        date = ?extraction.date,
        time = ?extraction.time,
        "extracted appointment details"
    );
    Json(json!({
        "success": true,
        "extraction": &extraction,
        "message": "Appointment details extracted successfully",
        "requires_confirmation": true,
    }))
    .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleBody {
    date_time: Option<String>,
    subject: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

async fn schedule_appointment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScheduleBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(date_time), Some(subject)) = (body.date_time, body.subject) else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    let scheduled_at = DateTime::parse_from_rfc3339(&date_time)
        .map_err(|e| ApiError::Validation(format!("Invalid dateTime: {e}")))?
        .with_timezone(&Utc);

    let email = body.email.filter(|s| !s.trim().is_empty());
    let phone = body.phone.filter(|s| !s.trim().is_empty());

    if let Some(email) = email.as_deref()
        && !validate::validate_email(email)
    {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }
    if let Some(phone) = phone.as_deref()
        && !validate::validate_phone(phone)
    {
        return Err(ApiError::Validation(
            "Invalid phone number format".to_string(),
        ));
    }

    let id = state
        .scheduler
        .schedule(ScheduleRequest {
            subject,
            scheduled_at,
            email,
            phone,
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointmentId": id,
        "message": "Appointment scheduled successfully",
    })))
}

async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // A malformed id can never name a live appointment.
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;
    state.scheduler.cancel(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
    })))
}
