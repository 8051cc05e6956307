//! Client-side call session lifecycle for Ringback.
//!
//! After the intake flow hands over a join URL, the visitor's browser embeds
//! a live audio/video frame from an external provider. This crate owns that
//! frame: it probes camera permission, creates and joins exactly one frame
//! at a time, tears it down on every exit path, and reduces provider errors
//! to the [`ringback_types::ErrorCategory`] taxonomy.
//!
//! The layers, leaves first:
//!
//! - [`PermissionGate`] opens and immediately releases a camera stream.
//! - [`CallFrameHandle`] creates, joins and destroys the single provider frame.
//! - [`SessionManager`] serializes start/stop/retry requests and publishes
//!   [`ringback_types::SessionUpdate`]s.
//!
//! The provider itself is reached through the traits in [`provider`].

pub mod classify;
pub mod config;
pub mod error;
pub mod frame;
pub mod manager;
pub mod permission;
pub mod provider;

pub use classify::classify_provider_error;
pub use config::{FrameOptions, IframeStyle};
pub use error::{CreateError, PermissionDenied, ProviderError};
pub use frame::{CallFrameHandle, FrameEvent, FrameEventSender, FrameRef};
pub use manager::SessionManager;
pub use permission::PermissionGate;
pub use provider::{
    CreatedFrame, DeviceStream, FrameProvider, MediaDevices, ProviderEvent, ProviderFrame,
    RenderTarget,
};
