//! Recording test doubles for the provider seam.

#![allow(dead_code)]

use async_trait::async_trait;
use ringback_call::{
    CallFrameHandle, CreatedFrame, DeviceStream, FrameOptions, FrameProvider, MediaDevices,
    PermissionGate, ProviderError, ProviderEvent, ProviderFrame, RenderTarget, SessionManager,
};
use ringback_types::{SessionStatus, SessionUpdate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Semaphore};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// ── Media devices ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDevices {
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    deny: AtomicBool,
}

struct MockStream {
    closes: Arc<AtomicUsize>,
    stopped: bool,
}

impl DeviceStream for MockStream {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl MockDevices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevices for MockDevices {
    async fn open_camera(&self) -> Result<Box<dyn DeviceStream>, ProviderError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(ProviderError::new("NotAllowedError", "Permission denied"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            closes: Arc::clone(&self.closes),
            stopped: false,
        }))
    }
}

// ── Call provider ────────────────────────────────────────────────────

#[derive(Default)]
struct ProviderState {
    log: Vec<String>,
    next_id: u64,
    live: usize,
    max_live: usize,
    senders: HashMap<u64, mpsc::UnboundedSender<ProviderEvent>>,
    fail_create: bool,
    fail_join: bool,
    fail_destroy: bool,
    manual_joined: bool,
    join_gate: Option<Arc<Semaphore>>,
}

#[derive(Default)]
pub struct MockProvider {
    state: Arc<Mutex<ProviderState>>,
}

struct MockFrame {
    id: u64,
    state: Arc<Mutex<ProviderState>>,
    events: mpsc::UnboundedSender<ProviderEvent>,
    destroyed: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ProviderState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.with_state(|s| s.fail_create = fail);
    }

    pub fn set_fail_join(&self, fail: bool) {
        self.with_state(|s| s.fail_join = fail);
    }

    pub fn set_fail_destroy(&self, fail: bool) {
        self.with_state(|s| s.fail_destroy = fail);
    }

    /// Stops the mock from reporting joined-meeting on its own.
    pub fn set_manual_joined(&self, manual: bool) {
        self.with_state(|s| s.manual_joined = manual);
    }

    /// Makes every `join` wait for a permit from [`MockProvider::release_joins`].
    pub fn gate_joins(&self) {
        self.with_state(|s| s.join_gate = Some(Arc::new(Semaphore::new(0))));
    }

    pub fn release_joins(&self, count: usize) {
        if let Some(gate) = self.with_state(|s| s.join_gate.clone()) {
            gate.add_permits(count);
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.with_state(|s| s.log.clone())
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.log().iter().position(|e| e == entry)
    }

    pub fn live(&self) -> usize {
        self.with_state(|s| s.live)
    }

    pub fn max_live(&self) -> usize {
        self.with_state(|s| s.max_live)
    }

    pub fn created(&self) -> u64 {
        self.with_state(|s| s.next_id)
    }

    /// Emits a raw event from the most recently created frame.
    pub fn emit(&self, event: ProviderEvent) {
        self.with_state(|s| {
            let latest = s.senders.keys().max().copied();
            if let Some(tx) = latest.and_then(|id| s.senders.get(&id)) {
                let _ = tx.send(event);
            }
        });
    }
}

#[async_trait]
impl FrameProvider for MockProvider {
    async fn create_frame(
        &self,
        target: &RenderTarget,
        _options: &FrameOptions,
    ) -> Result<CreatedFrame, ProviderError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.with_state(|s| {
            if s.fail_create {
                return Err(ProviderError::new("error", "iframe could not be created"));
            }
            s.next_id += 1;
            s.live += 1;
            s.max_live = s.max_live.max(s.live);
            s.log.push(format!("create:{}:{}", s.next_id, target.id()));
            s.senders.insert(s.next_id, tx.clone());
            Ok(s.next_id)
        })?;

        Ok(CreatedFrame {
            frame: Box::new(MockFrame {
                id,
                state: Arc::clone(&self.state),
                events: tx,
                destroyed: AtomicBool::new(false),
            }),
            events: rx,
        })
    }
}

#[async_trait]
impl ProviderFrame for MockFrame {
    async fn join(&self, join_url: &str) -> Result<(), ProviderError> {
        let gate = {
            let mut s = self.state.lock().unwrap();
            s.log.push(format!("join:{}:{}", self.id, join_url));
            s.join_gate.clone()
        };
        let _ = self.events.send(ProviderEvent::JoiningMeeting);

        if let Some(gate) = gate {
            gate.acquire().await.expect("join gate closed").forget();
        }

        let (fail, manual) = {
            let s = self.state.lock().unwrap();
            (s.fail_join, s.manual_joined)
        };
        if fail {
            return Err(ProviderError::new("error", "meeting not found"));
        }
        if !manual {
            let _ = self.events.send(ProviderEvent::JoinedMeeting);
        }
        Ok(())
    }

    async fn destroy(&self) -> Result<(), ProviderError> {
        let mut s = self.state.lock().unwrap();
        s.log.push(format!("destroy:{}", self.id));
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            s.live -= 1;
            s.senders.remove(&self.id);
        }
        if s.fail_destroy {
            return Err(ProviderError::new("error", "frame already detached"));
        }
        Ok(())
    }
}

// ── Harness ──────────────────────────────────────────────────────────

pub fn frame_handle(devices: &Arc<MockDevices>, provider: &Arc<MockProvider>) -> CallFrameHandle {
    CallFrameHandle::new(
        Arc::clone(provider) as Arc<dyn FrameProvider>,
        PermissionGate::new(Arc::clone(devices) as Arc<dyn MediaDevices>),
        FrameOptions::default(),
    )
}

pub struct Harness {
    pub devices: Arc<MockDevices>,
    pub provider: Arc<MockProvider>,
    pub manager: SessionManager,
    pub updates: broadcast::Receiver<SessionUpdate>,
}

pub fn harness() -> Harness {
    let devices = MockDevices::new();
    let provider = MockProvider::new();
    let manager = SessionManager::new(frame_handle(&devices, &provider));
    let updates = manager.subscribe();
    Harness {
        devices,
        provider,
        manager,
        updates,
    }
}

pub async fn next_update(updates: &mut broadcast::Receiver<SessionUpdate>) -> SessionUpdate {
    tokio::time::timeout(WAIT_TIMEOUT, updates.recv())
        .await
        .expect("timed out waiting for a session update")
        .expect("update channel closed")
}

/// Collects updates up to and including the first one with `status`.
pub async fn updates_until(
    updates: &mut broadcast::Receiver<SessionUpdate>,
    status: SessionStatus,
) -> Vec<SessionUpdate> {
    let mut seen = Vec::new();
    loop {
        let update = next_update(updates).await;
        let done = update.status == status;
        seen.push(update);
        if done {
            return seen;
        }
    }
}

pub fn statuses(updates: &[SessionUpdate]) -> Vec<SessionStatus> {
    updates.iter().map(|u| u.status).collect()
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}
