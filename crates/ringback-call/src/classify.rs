//! Reduction of raw provider events to the user-facing error taxonomy.
//!
//! Every provider payload maps to exactly one [`ErrorCategory`]; the matches
//! below are exhaustive so a new category cannot be added without deciding
//! where it comes from.

use crate::error::ProviderError;
use crate::frame::FrameEvent;
use crate::provider::ProviderEvent;
use ringback_types::ErrorCategory;

const CAMERA_ERROR_KIND: &str = "camera-error";

/// Classifies an `error` event payload reported after the frame exists.
pub fn classify_provider_error(error: &ProviderError) -> ErrorCategory {
    if error.kind.eq_ignore_ascii_case(CAMERA_ERROR_KIND)
        || error.message.to_ascii_lowercase().contains("camera")
    {
        ErrorCategory::CameraHardwareError
    } else {
        ErrorCategory::GenericCallError
    }
}

/// Maps a raw provider event to the event surface exposed by the frame handle.
pub fn frame_event(event: ProviderEvent) -> FrameEvent {
    match event {
        ProviderEvent::JoiningMeeting => FrameEvent::Joining,
        ProviderEvent::JoinedMeeting => FrameEvent::Joined,
        ProviderEvent::LeftMeeting => FrameEvent::Left,
        ProviderEvent::Error(error) => FrameEvent::Error(classify_provider_error(&error)),
        ProviderEvent::CameraError(_) => FrameEvent::CameraError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_messages_are_hardware_errors() {
        let error = ProviderError::new("error", "Camera disconnected mid-call");
        assert_eq!(
            classify_provider_error(&error),
            ErrorCategory::CameraHardwareError
        );
    }

    #[test]
    fn camera_error_kind_is_hardware_error() {
        let error = ProviderError::new("camera-error", "");
        assert_eq!(
            classify_provider_error(&error),
            ErrorCategory::CameraHardwareError
        );
    }

    #[test]
    fn other_errors_are_generic() {
        for error in [
            ProviderError::default(),
            ProviderError::new("ejected", "You were removed from the meeting"),
            ProviderError::new("error", "network timeout"),
        ] {
            assert_eq!(
                classify_provider_error(&error),
                ErrorCategory::GenericCallError
            );
        }
    }

    #[test]
    fn raw_json_payloads_classify() {
        let payload: ProviderError =
            serde_json::from_str(r#"{"action":"error","errorMsg":"camera not found"}"#).unwrap();
        assert_eq!(
            classify_provider_error(&payload),
            ErrorCategory::CameraHardwareError
        );

        let payload: ProviderError = serde_json::from_str(r#"{"unexpected":42}"#).unwrap();
        assert_eq!(
            classify_provider_error(&payload),
            ErrorCategory::GenericCallError
        );
    }

    #[test]
    fn camera_error_events_never_become_generic() {
        let event = ProviderEvent::CameraError(ProviderError::new("camera-error", "busy"));
        assert_eq!(frame_event(event), FrameEvent::CameraError);
        assert_eq!(
            frame_event(ProviderEvent::Error(ProviderError::new("error", "boom"))),
            FrameEvent::Error(ErrorCategory::GenericCallError)
        );
    }
}
