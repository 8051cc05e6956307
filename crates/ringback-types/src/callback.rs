//! Callback request records owned by the intake flow.

use serde::{Deserialize, Serialize};

/// Processing state of a callback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackStatus {
    /// Stored, voice-AI call not yet requested.
    Pending,
    /// The voice-AI call produced a joinable endpoint.
    Calling,
    /// The voice-AI call was requested but no live session is available.
    Acknowledged,
    /// The voice-AI call could not be started.
    Failed,
}

impl CallbackStatus {
    /// Returns the string stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Calling => "calling",
            Self::Acknowledged => "acknowledged",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CallbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallbackStatus {
    type Err = ParseCallbackStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "calling" => Ok(Self::Calling),
            "acknowledged" => Ok(Self::Acknowledged),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseCallbackStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown callback status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown callback status: {0}")]
pub struct ParseCallbackStatusError(pub String);

/// A persisted callback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRequest {
    /// Database identifier.
    pub id: i64,
    /// Phone number the voice agent should call.
    pub phone: String,
    /// Contact email; also the identity the request is read back under.
    pub email: String,
    /// Processing state.
    pub status: CallbackStatus,
    /// Creation time, RFC 3339.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}
