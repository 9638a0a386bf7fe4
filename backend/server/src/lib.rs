//! Student council complaint desk.
//!
//! Bilingual (Arabic/English) backend for the council website's complaints and
//! suggestions form. Everything else on the site is static content.
//!
//!
//!
//! # General Infrastructure
//! - Frontend posts the form to `POST /complaints`
//! - This service validates it, then runs the numbering transaction against Redis
//! - Each complaint gets the next integer in a dense sequence starting at 1
//! - The counter record is created once by an operator with the `admin` tool
//!
//!
//!
//! # Routes
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /complaints` | Submit a complaint or suggestion, returns the assigned number |
//! | `GET /categories?lang=` | Localized category labels for the form chips |
//! | `POST /lang` | Persist the selected language in the `lang` cookie |
//! | `GET /health` | 200 when the store answers |
//!
//!
//!
//! # Failures
//!
//! Two kinds reach the caller and are logged apart:
//! - **Configuration**: the counter record is missing. Not retryable, fix the deployment.
//! - **Transaction**: connectivity, permission or exhausted conflict retries. Resubmitting is safe,
//!   a failed attempt commits nothing.
//!
//! The user sees one generic localized message for both.
//!
//!
//!
//! # Setup
//!
//! Start Redis and create the counter.
//! ```sh
//! docker run -d -p 6379:6379 redis:7
//! cargo run -p admin -- init
//! ```
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p council
//! ```
//!
//! Without Redis.
//! ```sh
//! COUNCIL_STORE=memory RUST_LOG=debug cargo run -p council
//! ```
//!
//! Hammer it.
//! ```sh
//! cargo run -p tester -- --count 200 --concurrency 32
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod routes;
pub mod state;
pub mod store;
pub mod submission;
pub mod utils;

use routes::{categories_handler, health_handler, lang_handler, submit_handler};
use state::AppState;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let allow_origin = match &state.config.allowed_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/complaints", post(submit_handler))
        .route("/categories", get(categories_handler))
        .route("/lang", post(lang_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
