//! Seams to the external call provider and the browser media devices.
//!
//! The voice/video transport is not implemented here. A browser binding or a
//! test double supplies these traits; the rest of the crate only talks to
//! them through [`crate::PermissionGate`] and [`crate::CallFrameHandle`].

use crate::config::FrameOptions;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// An open camera stream returned by [`MediaDevices::open_camera`].
pub trait DeviceStream: Send {
    /// Stops every track of the stream, releasing the device.
    fn stop(&mut self);
}

/// Access to the local camera and microphone.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Requests a video stream, prompting the user for permission if needed.
    async fn open_camera(&self) -> Result<Box<dyn DeviceStream>, ProviderError>;
}

/// Raw events emitted by a provider frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    JoiningMeeting,
    JoinedMeeting,
    /// The participant left, usually through the frame's own leave button.
    LeftMeeting,
    Error(ProviderError),
    CameraError(ProviderError),
}

/// One embedded call frame owned by the provider.
#[async_trait]
pub trait ProviderFrame: Send + Sync {
    /// Joins the call endpoint identified by `join_url`.
    async fn join(&self, join_url: &str) -> Result<(), ProviderError>;

    /// Tears the frame down. The provider drops its event sender.
    async fn destroy(&self) -> Result<(), ProviderError>;
}

/// A freshly instantiated frame together with its event stream.
pub struct CreatedFrame {
    pub frame: Box<dyn ProviderFrame>,
    pub events: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl std::fmt::Debug for CreatedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedFrame").finish_non_exhaustive()
    }
}

/// Factory for provider frames.
#[async_trait]
pub trait FrameProvider: Send + Sync {
    /// Instantiates a frame bound to `target`.
    async fn create_frame(
        &self,
        target: &RenderTarget,
        options: &FrameOptions,
    ) -> Result<CreatedFrame, ProviderError>;
}

/// Handle to an already-mounted display surface a frame renders into.
///
/// Clones share mount state: once any clone calls [`RenderTarget::unmount`],
/// every clone reports the target as gone.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    id: Arc<str>,
    mounted: Arc<AtomicBool>,
}

impl RenderTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Marks the surface as removed from the view.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}
