use crate::error::IntakeError;
use crate::store;
use crate::voice_ai::{CallInitiation, CallInitiator};
use ringback_db::DbPool;
use ringback_types::{CallbackRequest, CallbackStatus};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// The call was requested but produced no joinable endpoint.
    Acknowledged { request: CallbackRequest },
    /// The call can be joined in the browser at `join_url`.
    CallReady {
        request: CallbackRequest,
        join_url: String,
    },
}

impl IntakeOutcome {
    pub fn request(&self) -> &CallbackRequest {
        match self {
            Self::Acknowledged { request } | Self::CallReady { request, .. } => request,
        }
    }

    /// The URL to hand to the session manager, if there is one.
    pub fn join_url(&self) -> Option<&str> {
        match self {
            Self::Acknowledged { .. } => None,
            Self::CallReady { join_url, .. } => Some(join_url),
        }
    }
}

/// Stores callback requests and starts the voice-AI call for each.
#[derive(Clone)]
pub struct IntakeFlow {
    pool: DbPool,
    initiator: Arc<dyn CallInitiator>,
}

impl IntakeFlow {
    pub fn new(pool: DbPool, initiator: Arc<dyn CallInitiator>) -> Self {
        Self { pool, initiator }
    }

    /// Persists a request and triggers the voice-AI call.
    ///
    /// The request is stored before the provider is contacted, so a failed
    /// initiation still leaves a record (marked `failed`).
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidInput` for a blank phone number or a
    /// malformed email, and the provider or database error otherwise.
    pub async fn submit(&self, phone: &str, email: &str) -> Result<IntakeOutcome, IntakeError> {
        let phone = phone.trim().to_string();
        let email = email.trim().to_string();
        if phone.is_empty() {
            return Err(IntakeError::InvalidInput(
                "phone number is required".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(IntakeError::InvalidInput(
                "a valid email address is required".to_string(),
            ));
        }

        let created_at = chrono::Utc::now().to_rfc3339();
        let initiation = CallInitiation {
            phone_number: phone.clone(),
            email: email.clone(),
        };
        let mut request = self
            .with_conn(move |conn| store::insert_request(conn, &phone, &email, &created_at))
            .await?;
        info!(request_id = request.id, "callback request stored");

        let call = match self.initiator.initiate(&initiation).await {
            Ok(call) => call,
            Err(e) => {
                warn!(request_id = request.id, "failed to initiate callback: {}", e);
                let id = request.id;
                if let Err(update) = self
                    .with_conn(move |conn| {
                        store::update_status(conn, id, CallbackStatus::Failed, None)
                    })
                    .await
                {
                    warn!(request_id = id, "failed to mark request as failed: {}", update);
                }
                return Err(e);
            }
        };

        let join_url = call.join_url().map(str::to_owned);
        let status = if join_url.is_some() {
            CallbackStatus::Calling
        } else {
            CallbackStatus::Acknowledged
        };
        let (id, call_id) = (request.id, call.id.clone());
        self.with_conn(move |conn| store::update_status(conn, id, status, Some(&call_id)))
            .await?;
        request.status = status;

        info!(request_id = request.id, %status, "callback request processed");
        Ok(match join_url {
            Some(join_url) => IntakeOutcome::CallReady { request, join_url },
            None => IntakeOutcome::Acknowledged { request },
        })
    }

    /// The latest request filed under `email`, for the "view my request" page.
    pub async fn lookup(&self, email: &str) -> Result<Option<CallbackRequest>, IntakeError> {
        let email = email.trim().to_string();
        self.with_conn(move |conn| store::latest_for_email(conn, &email))
            .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, IntakeError>
    where
        F: FnOnce(&Connection) -> Result<T, IntakeError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&*conn)
        })
        .await?
    }
}

impl std::fmt::Debug for IntakeFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeFlow").finish_non_exhaustive()
    }
}
