//! Shared types for the Ringback callback service.
//!
//! This crate holds the vocabulary that crosses crate boundaries: the call
//! session status model observed by the presentation layer, the closed error
//! taxonomy surfaced to users, and the callback request record written by the
//! intake flow. It carries no behaviour beyond parsing and labelling.

pub mod callback;

pub use callback::{CallbackRequest, CallbackStatus, ParseCallbackStatusError};

use serde::{Deserialize, Serialize};

/// Lifecycle status of the single embedded call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session exists.
    #[default]
    Idle,
    /// The camera/microphone probe is running.
    AcquiringPermission,
    /// Permission was granted; the call frame is being instantiated.
    Connecting,
    /// The frame exists and is joining the call endpoint.
    Joining,
    /// The provider reported that the frame joined the call.
    Active,
    /// The session is being torn down.
    Ending,
    /// The current attempt failed; see the accompanying [`ErrorCategory`].
    Failed,
}

impl SessionStatus {
    /// Returns the canonical string label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AcquiringPermission => "acquiring_permission",
            Self::Connecting => "connecting",
            Self::Joining => "joining",
            Self::Active => "active",
            Self::Ending => "ending",
            Self::Failed => "failed",
        }
    }

    /// Whether a call frame may be alive in this status.
    pub fn holds_frame(self) -> bool {
        matches!(self, Self::Joining | Self::Active)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of error categories the user interface can be shown.
///
/// Provider-specific error payloads never cross into the presentation layer;
/// they are always reduced to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The camera/microphone probe was rejected.
    PermissionDenied,
    /// Frame instantiation or the join request failed.
    CreateFailed,
    /// A device fault reported after join.
    CameraHardwareError,
    /// Any other provider error.
    GenericCallError,
}

impl ErrorCategory {
    /// All categories, in declaration order.
    pub const ALL: [ErrorCategory; 4] = [
        Self::PermissionDenied,
        Self::CreateFailed,
        Self::CameraHardwareError,
        Self::GenericCallError,
    ];

    /// Returns the canonical string label for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::CreateFailed => "create_failed",
            Self::CameraHardwareError => "camera_hardware_error",
            Self::GenericCallError => "generic_call_error",
        }
    }

    /// Message shown next to the retry action.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access denied. Please allow camera access to join the call."
            }
            Self::CreateFailed => "Error setting up the call. Please try again.",
            Self::CameraHardwareError => {
                "Camera error. Please check your camera connection and permissions."
            }
            Self::GenericCallError => "Error in video call. Please try again.",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status transition as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    /// The status the session moved into.
    pub status: SessionStatus,
    /// Join URL of the session this update belongs to, if any.
    pub join_url: Option<String>,
    /// Set only when `status` is [`SessionStatus::Failed`].
    pub last_error: Option<ErrorCategory>,
}

impl SessionUpdate {
    /// The idle update with no session attached.
    pub fn idle() -> Self {
        Self::default()
    }
}
