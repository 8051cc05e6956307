use crate::error::PermissionDenied;
use crate::provider::{DeviceStream, MediaDevices};
use std::sync::Arc;
use tracing::{debug, warn};

/// Checks camera authorization without keeping the device open.
#[derive(Clone)]
pub struct PermissionGate {
    devices: Arc<dyn MediaDevices>,
}

/// Owns a probe stream and stops it on every exit path.
struct Probe(Box<dyn DeviceStream>);

impl Drop for Probe {
    fn drop(&mut self) {
        self.0.stop();
    }
}

impl PermissionGate {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self { devices }
    }

    /// Opens the camera and releases it straight away.
    ///
    /// The camera LED blinks briefly. No stream outlives this call, whether it
    /// succeeds, fails, or the returned future is dropped after the stream
    /// was opened.
    pub async fn acquire(&self) -> Result<(), PermissionDenied> {
        match self.devices.open_camera().await {
            Ok(stream) => {
                let _probe = Probe(stream);
                debug!("camera permission granted, probe released");
                Ok(())
            }
            Err(reason) => {
                warn!(kind = %reason.kind, "camera permission denied: {}", reason.message);
                Err(PermissionDenied { reason })
            }
        }
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}
