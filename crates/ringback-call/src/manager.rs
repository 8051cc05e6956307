//! The process-wide call session coordinator.
//!
//! A [`SessionManager`] owns the only [`CallFrameHandle`] and runs every
//! start, stop and retry request on a single actor task, one at a time, in
//! the order the requests were issued. Callers never block: they enqueue a
//! request and observe its progress through [`SessionManager::subscribe`].
//!
//! Every request takes a ticket from a shared counter. A sequence that is
//! still waiting on the provider when a newer ticket is issued is superseded:
//! once its `create` settles, whatever frame it produced is destroyed and the
//! newer request takes over. Provider calls themselves are never aborted.

use crate::frame::{CallFrameHandle, FrameEvent};
use crate::provider::RenderTarget;
use ringback_types::{ErrorCategory, SessionStatus, SessionUpdate};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Default capacity for the status transition broadcast channel.
const DEFAULT_UPDATE_BROADCAST_CAPACITY: usize = 256;

enum Command {
    Start {
        ticket: u64,
        join_url: String,
        target: RenderTarget,
    },
    Retry {
        ticket: u64,
    },
    Stop,
    Settle(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

struct Shared {
    tickets: AtomicU64,
    updates: broadcast::Sender<SessionUpdate>,
    snapshot: watch::Sender<SessionUpdate>,
}

impl Shared {
    fn issue_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.tickets.load(Ordering::Acquire) > ticket
    }
}

/// Handle to the session actor. Cheap to clone; all clones drive the same
/// session.
///
/// Construct one per application process at startup. When the last handle is
/// dropped, or [`SessionManager::shutdown`] is called, the live frame is torn
/// down and the actor exits.
#[derive(Clone)]
pub struct SessionManager {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Spawns the session actor on the current tokio runtime.
    pub fn new(frame: CallFrameHandle) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(DEFAULT_UPDATE_BROADCAST_CAPACITY);
        let (snapshot, _) = watch::channel(SessionUpdate::idle());
        let shared = Arc::new(Shared {
            tickets: AtomicU64::new(0),
            updates,
            snapshot,
        });

        let actor = Actor {
            frame: Arc::new(frame),
            shared: Arc::clone(&shared),
            commands: commands_rx,
            frame_events: None,
            status: SessionStatus::Idle,
            join_url: None,
            last_request: None,
        };
        tokio::spawn(actor.run());

        Self {
            commands: commands_tx,
            shared,
        }
    }

    /// Requests a session on `join_url`, rendered into `target`.
    ///
    /// Any existing session is fully torn down first. A request still in
    /// flight is superseded.
    pub fn start(&self, join_url: impl Into<String>, target: RenderTarget) {
        let ticket = self.shared.issue_ticket();
        self.send(Command::Start {
            ticket,
            join_url: join_url.into(),
            target,
        });
    }

    /// Re-runs the full sequence with the last requested join URL and target.
    pub fn retry(&self) {
        let ticket = self.shared.issue_ticket();
        self.send(Command::Retry { ticket });
    }

    /// Drives the session back to Idle. Safe to call in any state.
    pub fn stop(&self) {
        self.shared.issue_ticket();
        self.send(Command::Stop);
    }

    /// Subscribes to status transitions. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.shared.updates.subscribe()
    }

    /// The most recently published update.
    pub fn status(&self) -> SessionUpdate {
        self.shared.snapshot.borrow().clone()
    }

    /// Watches the latest update without seeing every transition.
    pub fn watch(&self) -> watch::Receiver<SessionUpdate> {
        self.shared.snapshot.subscribe()
    }

    /// Resolves once every request issued before this call has been handled.
    pub async fn settle(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Settle(done_tx));
        let _ = done_rx.await;
    }

    /// Tears down the live session and stops the actor.
    pub async fn shutdown(self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Shutdown(done_tx));
        let _ = done_rx.await;
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("session actor is gone, request dropped");
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

struct Actor {
    frame: Arc<CallFrameHandle>,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
    frame_events: Option<mpsc::UnboundedReceiver<FrameEvent>>,
    status: SessionStatus,
    join_url: Option<String>,
    last_request: Option<(String, RenderTarget)>,
}

impl Actor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Start { ticket, join_url, target }) => {
                        self.start(ticket, join_url, target).await;
                    }
                    Some(Command::Retry { ticket }) => match self.last_request.clone() {
                        Some((join_url, target)) => self.start(ticket, join_url, target).await,
                        None => debug!("retry requested before any session was started"),
                    },
                    Some(Command::Stop) => self.stop().await,
                    Some(Command::Settle(done)) => {
                        let _ = done.send(());
                    }
                    Some(Command::Shutdown(done)) => {
                        self.stop().await;
                        let _ = done.send(());
                        break;
                    }
                    None => {
                        self.stop().await;
                        break;
                    }
                },
                event = next_frame_event(&mut self.frame_events) => match event {
                    Some(event) => self.on_frame_event(event).await,
                    None => self.frame_events = None,
                },
            }
        }
        debug!("session actor stopped");
    }

    async fn start(&mut self, ticket: u64, join_url: String, target: RenderTarget) {
        self.last_request = Some((join_url.clone(), target.clone()));

        // A session in progress is fully stopped first: Ending, then Idle.
        if matches!(self.status, SessionStatus::Idle | SessionStatus::Failed) {
            self.frame_events = None;
            self.frame.destroy().await;
        } else {
            self.stop().await;
        }

        if self.shared.is_superseded(ticket) {
            debug!(ticket, "start superseded before it began");
            return;
        }

        info!(join_url = %join_url, target = target.id(), "starting call session");
        self.join_url = Some(join_url.clone());
        self.publish(SessionStatus::AcquiringPermission, None);

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let frame = Arc::clone(&self.frame);
        let create = frame.create(&target, &join_url, events_tx);
        tokio::pin!(create);

        // Failures and leaves seen while `create` holds the frame are applied
        // once it settles.
        let mut deferred = None;
        let result = loop {
            tokio::select! {
                biased;
                Some(event) = events_rx.recv() => self.on_progress(ticket, event, &mut deferred),
                result = &mut create => break result,
            }
        };
        while let Ok(event) = events_rx.try_recv() {
            self.on_progress(ticket, event, &mut deferred);
        }

        let superseded = self.shared.is_superseded(ticket);
        match result {
            Err(e) if superseded => {
                debug!(ticket, "superseded start failed: {}", e);
            }
            Err(e) => {
                warn!(join_url = %join_url, "error setting up call: {}", e);
                self.publish(SessionStatus::Failed, Some(e.category()));
            }
            Ok(frame_ref) if superseded => {
                info!(frame_id = frame_ref.id, "start superseded, destroying its frame");
                self.frame.destroy().await;
            }
            Ok(frame_ref) if !target.is_mounted() => {
                info!(
                    frame_id = frame_ref.id,
                    "render target unmounted while the frame was created, stopping"
                );
                self.stop().await;
            }
            Ok(_) => {
                self.frame_events = Some(events_rx);
                if let Some(event) = deferred {
                    self.on_frame_event(event).await;
                }
            }
        }
    }

    async fn stop(&mut self) {
        if self.status == SessionStatus::Idle {
            return;
        }
        if self.status != SessionStatus::Ending {
            self.publish(SessionStatus::Ending, None);
        }
        self.frame_events = None;
        self.frame.destroy().await;
        self.join_url = None;
        self.publish(SessionStatus::Idle, None);
        info!("call session stopped");
    }

    fn on_progress(&mut self, ticket: u64, event: FrameEvent, deferred: &mut Option<FrameEvent>) {
        if self.shared.is_superseded(ticket) {
            return;
        }
        match event {
            FrameEvent::PermissionGranted => self.publish(SessionStatus::Connecting, None),
            FrameEvent::Created => self.publish(SessionStatus::Joining, None),
            FrameEvent::Joining => debug!("provider is joining the meeting"),
            FrameEvent::Joined => self.publish(SessionStatus::Active, None),
            FrameEvent::Error(_) | FrameEvent::CameraError | FrameEvent::Left => {
                deferred.get_or_insert(event);
            }
        }
    }

    async fn on_frame_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Joined if self.status == SessionStatus::Joining => {
                self.publish(SessionStatus::Active, None);
            }
            FrameEvent::Error(category) => self.fail_live(category).await,
            FrameEvent::CameraError => self.fail_live(ErrorCategory::CameraHardwareError).await,
            FrameEvent::Left => self.stop().await,
            other => debug!(event = ?other, status = %self.status, "ignoring frame event"),
        }
    }

    async fn fail_live(&mut self, category: ErrorCategory) {
        if !self.status.holds_frame() {
            debug!(%category, status = %self.status, "ignoring error outside a live session");
            return;
        }
        self.frame_events = None;
        self.frame.destroy().await;
        self.publish(SessionStatus::Failed, Some(category));
    }

    fn publish(&mut self, status: SessionStatus, last_error: Option<ErrorCategory>) {
        self.status = status;
        let update = SessionUpdate {
            status,
            join_url: self.join_url.clone(),
            last_error,
        };
        debug!(%status, error = ?last_error, "session status changed");
        self.shared.snapshot.send_replace(update.clone());
        // No subscribers is fine.
        let _ = self.shared.updates.send(update);
    }
}

async fn next_frame_event(
    events: &mut Option<mpsc::UnboundedReceiver<FrameEvent>>,
) -> Option<FrameEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
