//! HTTP endpoint tests, driven through the router with `tower::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use remind_extract::Extractor;
use remind_notify::Notifier;
use remind_scheduler::{AppointmentScheduler, JobKind};
use remind_web::{AppState, create_router};

fn test_state(extractor: Option<Arc<Extractor>>) -> Arc<AppState> {
    let notifier = Arc::new(Notifier::disabled());
    let scheduler = Arc::new(AppointmentScheduler::new(Arc::clone(&notifier)));
    Arc::new(AppState {
        scheduler,
        notifier,
        extractor,
    })
}

fn router(state: &Arc<AppState>) -> Router {
    create_router(Arc::clone(state))
}

async fn send_json(router: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_subsystem_status() {
    let state = test_state(None);
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(&state), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["email_configured"], false);
    assert_eq!(body["sms_enabled"], false);
    assert_eq!(body["llm_enabled"], false);
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn schedule_returns_an_id_and_registers_the_reminder() {
    let state = test_state(None);

    let (status, body) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({
            "dateTime": "2030-01-01T10:00:00Z",
            "subject": "Dentist",
            "email": "a@b.com",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let id: uuid::Uuid = body["appointmentId"].as_str().unwrap().parse().unwrap();
    let job = state.scheduler.pending_job(id).await.unwrap();
    assert_eq!(job.kind, JobKind::Reminder);
    let expected: chrono::DateTime<chrono::Utc> = "2030-01-01T10:00:00Z".parse().unwrap();
    assert_eq!(job.fire_at, expected);
}

#[tokio::test]
async fn schedule_without_subject_is_rejected() {
    let state = test_state(None);

    let (status, body) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({ "dateTime": "2030-01-01T10:00:00Z" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn schedule_with_unparseable_timestamp_is_rejected() {
    let state = test_state(None);

    let (status, body) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({ "dateTime": "next tuesday", "subject": "Dentist" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid dateTime"));
}

#[tokio::test]
async fn schedule_in_the_past_is_rejected() {
    let state = test_state(None);

    let (status, _) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({ "dateTime": "2020-01-01T10:00:00Z", "subject": "Dentist" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.scheduler.pending_job_count().await, 0);
}

#[tokio::test]
async fn schedule_with_bad_email_is_rejected() {
    let state = test_state(None);

    let (status, body) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({
            "dateTime": "2030-01-01T10:00:00Z",
            "subject": "Dentist",
            "email": "not-an-address",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");
}

#[tokio::test]
async fn cancel_unknown_appointment_is_404() {
    let state = test_state(None);
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/appointments/doesnotexist")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router(&state), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Appointment not found");
}

#[tokio::test]
async fn schedule_then_cancel_round_trip() {
    let state = test_state(None);

    let (_, body) = send_json(
        router(&state),
        "POST",
        "/api/appointments/schedule",
        json!({ "dateTime": "2030-01-01T10:00:00Z", "subject": "Dentist" }),
    )
    .await;
    let id = body["appointmentId"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/appointments/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Cancelling again reports not found.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/appointments/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&state), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Appointment not found");
}

#[tokio::test]
async fn parse_message_without_extractor_falls_back_to_form() {
    let state = test_state(None);

    let (status, body) = send_json(
        router(&state),
        "POST",
        "/api/parse-message",
        json!({ "message": "dentist tomorrow at 3pm" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["fallback_to_form"], true);
}

mod with_extractor {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_extractor(model_json: &str) -> (MockServer, Arc<Extractor>) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": model_json }] } }]
            })))
            .mount(&mock_server)
            .await;

        let extractor = Arc::new(Extractor::new("key").with_api_base(mock_server.uri()));
        (mock_server, extractor)
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (_server, extractor) = mock_extractor("{}").await;
        let state = test_state(Some(extractor));

        let (status, body) = send_json(
            router(&state),
            "POST",
            "/api/parse-message",
            json!({ "message": "   " }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn complete_extraction_requires_confirmation() {
        let (_server, extractor) = mock_extractor(
            r#"{"date": "2030-01-01", "time": "10:00", "subject": "Dentist appointment", "confidence": 0.95}"#,
        )
        .await;
        let state = test_state(Some(extractor));

        let (status, body) = send_json(
            router(&state),
            "POST",
            "/api/parse-message",
            json!({ "message": "dentist on new year's day at 10am" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["requires_confirmation"], true);
        assert_eq!(body["extraction"]["subject"], "Dentist appointment");
    }

    #[tokio::test]
    async fn incomplete_extraction_asks_for_clarification() {
        let (_server, extractor) = mock_extractor(
            r#"{"date": "2030-01-01", "subject": "Meeting", "confidence": 0.7, "clarification_needed": "What time is the meeting?"}"#,
        )
        .await;
        let state = test_state(Some(extractor));

        let (status, body) = send_json(
            router(&state),
            "POST",
            "/api/parse-message",
            json!({ "message": "meeting on new year's day" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["missing_fields"], json!(["time"]));
        assert_eq!(body["clarification_needed"], "What time is the meeting?");
    }
}
