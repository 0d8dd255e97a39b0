//! JSON HTTP API for Remind.
//!
//! Exposes the appointment scheduler over HTTP:
//! - `GET /api/health` — subsystem status
//! - `POST /api/parse-message` — natural-language extraction
//! - `POST /api/appointments/schedule` — schedule an appointment
//! - `DELETE /api/appointments/{id}` — cancel an appointment

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{AppState, create_router};
