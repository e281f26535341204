//! Accident severity classifier — web frontend
//!
//! Loads an integrity-checked model artifact exactly once at startup and
//! serves a single-page prediction form. The load outcome gates the whole
//! prediction feature: on failure the page degrades to a diagnostic banner
//! and the classify routes answer 503, never a partially loaded model.

mod config;
mod error;
mod handlers;
mod integrity;
mod model;
mod record;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use integrity::{LoadError, VerifiedModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prf_gravidade=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Classificador de acidentes starting...");
    tracing::info!("Model artifact: {}", config.model_path);

    // Verify-then-load, once, before anything renders. The outcome becomes
    // part of the shared state either way.
    let outcome = integrity::load_verified(Path::new(&config.model_path), &config.model_sha256);
    match &outcome {
        Ok(v) => tracing::info!("integrity check passed, model loaded at {}", v.loaded_at),
        Err(e) => tracing::error!("model load failed, predictions disabled: {}", e),
    }

    let state = AppState {
        engine: Arc::new(outcome),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Load outcome, shared read-only for the process lifetime.
    pub engine: Arc<Result<VerifiedModel, LoadError>>,
    pub config: config::Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::index))
        .route("/classify", post(handlers::classify::classify_form))
        .route("/api/v1/classify", post(handlers::classify::classify_json))
        .route("/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
