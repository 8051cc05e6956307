//! API handlers for the Ringback server.

use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use ringback_intake::{IntakeError, IntakeOutcome};
use ringback_types::{CallbackRequest, CallbackStatus};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Header carrying the caller's verified email, set by the fronting auth proxy.
pub const AUTHENTICATED_EMAIL_HEADER: &str = "x-authenticated-email";

/// Request body for `POST /api/callbacks`.
#[derive(Debug, Deserialize)]
pub struct SubmitCallbackRequest {
    pub phone: String,
    pub email: String,
}

/// Response body for a submitted callback request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitCallbackResponse {
    #[serde(rename = "requestId")]
    pub request_id: i64,
    pub status: CallbackStatus,
    /// Present when the call can be joined in the browser right away.
    #[serde(rename = "joinUrl", skip_serializing_if = "Option::is_none", default)]
    pub join_url: Option<String>,
}

impl From<IntakeOutcome> for SubmitCallbackResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        let join_url = outcome.join_url().map(str::to_owned);
        let request = outcome.request();
        Self {
            request_id: request.id,
            status: request.status,
            join_url,
        }
    }
}

/// Response body for `GET /api/callbacks/mine`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackView {
    #[serde(rename = "requestId")]
    pub request_id: i64,
    pub phone: String,
    pub email: String,
    pub status: CallbackStatus,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<CallbackRequest> for CallbackView {
    fn from(request: CallbackRequest) -> Self {
        Self {
            request_id: request.id,
            phone: request.phone,
            email: request.email,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream error: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::InvalidInput(msg) => ApiError::BadRequest(msg),
            IntakeError::NotFound(id) => ApiError::NotFound(format!("callback request {id}")),
            IntakeError::Http(_) | IntakeError::VoiceAi(_) => {
                tracing::warn!("voice-AI call initiation failed: {}", e);
                ApiError::BadGateway("could not start the callback call".to_string())
            }
            IntakeError::Database(_) | IntakeError::Pool(_) | IntakeError::Task(_) => {
                tracing::error!("callback request storage failed: {}", e);
                ApiError::InternalServerError("internal error".to_string())
            }
        }
    }
}

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `POST /api/callbacks`.
///
/// Stores the request and asks the voice-AI provider to call back. When the
/// provider returns a joinable endpoint it is passed through as `joinUrl`.
pub async fn submit_callback_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SubmitCallbackRequest>,
) -> Result<(StatusCode, Json<SubmitCallbackResponse>), ApiError> {
    let outcome = state.intake.submit(&payload.phone, &payload.email).await?;
    tracing::info!(
        request_id = outcome.request().id,
        status = %outcome.request().status,
        "callback request accepted"
    );
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Handler for `GET /api/callbacks/mine`.
pub async fn my_callback_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CallbackView>, ApiError> {
    let email = headers
        .get(AUTHENTICATED_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("sign in to view your request".to_string()))?;

    let request = state
        .intake
        .lookup(email)
        .await?
        .ok_or_else(|| ApiError::NotFound("no callback request on file".to_string()))?;

    Ok(Json(request.into()))
}
