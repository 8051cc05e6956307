use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("callback request not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("voice-AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("voice-AI provider error: {0}")]
    VoiceAi(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
