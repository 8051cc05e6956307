use ringback_types::ErrorCategory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw error payload reported by the call provider or the media devices.
///
/// The field names follow the provider's event JSON (`type`, `errorMsg`).
/// Nothing outside this crate ever sees one of these; see
/// [`crate::classify`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    #[serde(rename = "type", alias = "action", default)]
    pub kind: String,
    #[serde(rename = "errorMsg", alias = "message", default)]
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// The camera/microphone probe was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("camera access denied: {reason}")]
pub struct PermissionDenied {
    /// The provider's reason, verbatim.
    pub reason: ProviderError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    #[error("frame initialization already in progress")]
    AlreadyInitializing,

    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error("failed to instantiate call frame: {0}")]
    Instantiate(ProviderError),

    #[error("failed to join call: {0}")]
    JoinFailed(ProviderError),
}

impl CreateError {
    /// Reduces this error to the category shown to the user.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PermissionDenied(_) => ErrorCategory::PermissionDenied,
            Self::AlreadyInitializing | Self::Instantiate(_) | Self::JoinFailed(_) => {
                ErrorCategory::CreateFailed
            }
        }
    }
}
