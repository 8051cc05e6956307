//! Ringback server library logic.
//!
//! Hosts the callback intake endpoints. The in-browser call session itself
//! runs client-side on `ringback-call`, fed by the `joinUrl` returned here.

pub mod api;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use ringback_intake::IntakeFlow;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Callback submissions are two short strings.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Callback intake (storage plus voice-AI initiation).
    pub intake: Arc<IntakeFlow>,
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_handler))
        .route("/api/callbacks", post(api::submit_callback_handler))
        .route("/api/callbacks/mine", get(api::my_callback_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
