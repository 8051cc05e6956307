use crate::classify;
use crate::config::FrameOptions;
use crate::error::CreateError;
use crate::permission::PermissionGate;
use crate::provider::{FrameProvider, ProviderEvent, ProviderFrame, RenderTarget};
use ringback_types::ErrorCategory;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Events a [`CallFrameHandle`] reports upward while creating and running a
/// frame. Provider payloads are already classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// The permission probe succeeded.
    PermissionGranted,
    /// The provider frame was instantiated and is about to join.
    Created,
    Joining,
    Joined,
    /// The participant left from inside the frame.
    Left,
    Error(ErrorCategory),
    CameraError,
}

pub type FrameEventSender = mpsc::UnboundedSender<FrameEvent>;

/// Identifies the frame produced by a successful [`CallFrameHandle::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRef {
    pub id: u64,
    pub join_url: String,
}

struct LiveFrame {
    id: u64,
    join_url: String,
    frame: Box<dyn ProviderFrame>,
    forwarder: JoinHandle<()>,
}

impl Drop for LiveFrame {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Clears the initializing flag when `create` returns or is dropped.
struct InitializingGuard<'a>(&'a AtomicBool);

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the single embedded call frame.
///
/// `create` and `destroy` both run under one async lock, so a `destroy` issued
/// while a `create` is in flight waits for it to settle and then tears down
/// whatever it produced, and a `create` never starts while a `destroy` is
/// still running.
pub struct CallFrameHandle {
    provider: Arc<dyn FrameProvider>,
    permission: PermissionGate,
    options: FrameOptions,
    initializing: AtomicBool,
    slot: Mutex<Option<LiveFrame>>,
    next_id: AtomicU64,
    teardown_failures: AtomicU64,
}

impl CallFrameHandle {
    pub fn new(
        provider: Arc<dyn FrameProvider>,
        permission: PermissionGate,
        options: FrameOptions,
    ) -> Self {
        Self {
            provider,
            permission,
            options,
            initializing: AtomicBool::new(false),
            slot: Mutex::new(None),
            next_id: AtomicU64::new(0),
            teardown_failures: AtomicU64::new(0),
        }
    }

    /// Destroys any existing frame, probes camera permission, instantiates a
    /// frame bound to `target` and joins `join_url`.
    ///
    /// Progress and classified provider events are sent to `events` until the
    /// frame is destroyed. On failure no frame is left behind.
    ///
    /// # Errors
    ///
    /// - `CreateError::AlreadyInitializing` if another `create` is outstanding.
    /// - `CreateError::PermissionDenied` if the probe was rejected.
    /// - `CreateError::Instantiate` / `CreateError::JoinFailed` for provider
    ///   failures.
    pub async fn create(
        &self,
        target: &RenderTarget,
        join_url: &str,
        events: FrameEventSender,
    ) -> Result<FrameRef, CreateError> {
        if self.initializing.swap(true, Ordering::AcqRel) {
            return Err(CreateError::AlreadyInitializing);
        }
        let _guard = InitializingGuard(&self.initializing);

        let mut slot = self.slot.lock().await;
        self.teardown(slot.take()).await;

        self.permission.acquire().await?;
        let _ = events.send(FrameEvent::PermissionGranted);

        let created = self
            .provider
            .create_frame(target, &self.options)
            .await
            .map_err(CreateError::Instantiate)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(frame_id = id, target = target.id(), "call frame created");
        let _ = events.send(FrameEvent::Created);

        // Stored before joining so a dropped `create` still leaves the frame
        // reachable for the next teardown.
        let frame = slot.insert(LiveFrame {
            id,
            join_url: join_url.to_string(),
            frame: created.frame,
            forwarder: tokio::spawn(forward_events(id, created.events, events)),
        });

        let joined = frame.frame.join(join_url).await;
        if let Err(e) = joined {
            warn!(frame_id = id, "join failed: {}", e);
            self.teardown(slot.take()).await;
            return Err(CreateError::JoinFailed(e));
        }

        Ok(FrameRef {
            id,
            join_url: join_url.to_string(),
        })
    }

    /// Tears down the current frame, if any.
    ///
    /// Idempotent. Provider failures are logged and counted, never returned.
    pub async fn destroy(&self) {
        let mut slot = self.slot.lock().await;
        self.teardown(slot.take()).await;
    }

    /// The frame currently held, if any. Waits for an in-flight `create`.
    pub async fn current(&self) -> Option<FrameRef> {
        self.slot.lock().await.as_ref().map(|live| FrameRef {
            id: live.id,
            join_url: live.join_url.clone(),
        })
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing.load(Ordering::Acquire)
    }

    /// Number of provider `destroy` calls that reported an error.
    pub fn teardown_failures(&self) -> u64 {
        self.teardown_failures.load(Ordering::Relaxed)
    }

    async fn teardown(&self, live: Option<LiveFrame>) {
        let Some(live) = live else {
            return;
        };
        live.forwarder.abort();
        match live.frame.destroy().await {
            Ok(()) => debug!(frame_id = live.id, "call frame destroyed"),
            Err(e) => {
                self.teardown_failures.fetch_add(1, Ordering::Relaxed);
                warn!(frame_id = live.id, "error destroying call frame: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for CallFrameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallFrameHandle")
            .field("options", &self.options)
            .field("initializing", &self.is_initializing())
            .finish_non_exhaustive()
    }
}

async fn forward_events(
    frame_id: u64,
    mut raw: mpsc::UnboundedReceiver<ProviderEvent>,
    events: FrameEventSender,
) {
    while let Some(event) = raw.recv().await {
        match &event {
            ProviderEvent::JoiningMeeting => info!(frame_id, "joining meeting"),
            ProviderEvent::JoinedMeeting => info!(frame_id, "joined meeting"),
            ProviderEvent::LeftMeeting => info!(frame_id, "left meeting"),
            ProviderEvent::Error(e) => warn!(frame_id, "call frame error: {}", e),
            ProviderEvent::CameraError(e) => warn!(frame_id, "camera error: {}", e),
        }
        if events.send(classify::frame_event(event)).is_err() {
            break;
        }
    }
}
