//! Remind: appointment reminder backend.
//!
//! Accepts appointment requests over HTTP, confirms them on each contact
//! channel, fires a reminder at the appointment time plus a follow-up two
//! minutes later, and optionally turns free-text messages into structured
//! appointment fields via the Gemini API.
//!
//! Every external service handle is constructed once here and injected;
//! absent SMS or extractor credentials disable that subsystem without
//! failing startup.

use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remind_extract::Extractor;
use remind_notify::{EmailSender, Notifier, SmsSender};
use remind_scheduler::AppointmentScheduler;
use remind_web::{AppState, create_router};

#[derive(Parser)]
#[command(name = "remind")]
#[command(about = "Appointment reminder backend", long_about = None)]
struct Cli {
    /// HTTP server port
    #[arg(long, env = "PORT", default_value = "10000")]
    port: u16,

    /// Mail account address (doubles as the sender)
    #[arg(long, env = "EMAIL_USER")]
    email_user: Option<String>,

    /// Mail account app password
    #[arg(long, env = "EMAIL_PASSWORD")]
    email_password: Option<String>,

    /// Twilio account SID
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    twilio_account_sid: Option<String>,

    /// Twilio auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN")]
    twilio_auth_token: Option<String>,

    /// Twilio sender phone number
    #[arg(long, env = "TWILIO_PHONE_NUMBER")]
    twilio_phone_number: Option<String>,

    /// Gemini API key for natural-language extraction
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "remind=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let email = match (&cli.email_user, &cli.email_password) {
        (Some(user), Some(password)) => match EmailSender::new(user, password) {
            Ok(sender) => {
                info!(user = %user, "email notifications enabled");
                Some(sender)
            }
            Err(e) => {
                warn!(error = %e, "mail transport unavailable, email notifications disabled");
                None
            }
        },
        _ => {
            info!("email notifications disabled (no mail credentials)");
            None
        }
    };

    // SMS is all-or-nothing: every Twilio variable must be present.
    let sms = match (
        &cli.twilio_account_sid,
        &cli.twilio_auth_token,
        &cli.twilio_phone_number,
    ) {
        (Some(sid), Some(token), Some(from)) => {
            info!("SMS notifications enabled");
            Some(SmsSender::new(sid, token, from))
        }
        _ => {
            info!("SMS notifications disabled (no Twilio credentials)");
            None
        }
    };

    let extractor = match &cli.gemini_api_key {
        Some(key) => {
            info!("natural language processing enabled");
            Some(Arc::new(Extractor::new(key)))
        }
        None => {
            info!("natural language processing disabled (missing GEMINI_API_KEY)");
            None
        }
    };

    let notifier = Arc::new(Notifier::new(email, sms));
    let scheduler = Arc::new(AppointmentScheduler::new(Arc::clone(&notifier)));

    // Handle shutdown signals
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let firing_loop = tokio::spawn(Arc::clone(&scheduler).run(shutdown_rx.clone()));

    let state = Arc::new(AppState {
        scheduler,
        notifier,
        extractor,
    });
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cli.port))
        .await
        .into_diagnostic()?;
    info!(port = cli.port, "appointment reminder server listening");

    let mut serve_shutdown = shutdown_rx;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
        })
        .await
        .into_diagnostic()?;

    firing_loop.await.into_diagnostic()?;
    info!("server shut down gracefully");

    Ok(())
}
