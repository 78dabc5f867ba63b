use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::player::event::{EventSender, PlayerEvent};

/// Identity of one requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameToken(pub u64);

/// Frame pacing collaborator (the host's "request animation frame").
///
/// A requested frame is delivered once as [`PlayerEvent::Frame`] unless cancelled first.
pub trait FrameScheduler {
    fn request_frame(&mut self, events: &EventSender) -> FrameToken;

    fn cancel_frame(&mut self, token: FrameToken);
}

/// Tracks the single outstanding frame of the redraw loop.
#[derive(Debug, Default)]
pub struct RenderLoop {
    pending: Option<FrameToken>,
    ticks: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of frames handled since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Schedule a frame unless one is already outstanding.
    pub fn ensure_scheduled(&mut self, scheduler: &mut dyn FrameScheduler, events: &EventSender) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame(events));
        }
    }

    /// Consume a delivered frame. Returns `false` for frames that were cancelled or superseded.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.pending != Some(token) {
            tracing::trace!(token = token.0, "stale frame ignored");
            return false;
        }
        self.pending = None;
        self.ticks += 1;
        true
    }

    /// Cancel the outstanding frame. Returns whether one was outstanding.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        match self.pending.take() {
            Some(token) => {
                scheduler.cancel_frame(token);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct ManualState {
    next: u64,
    pending: Vec<(FrameToken, EventSender)>,
    cancelled: u64,
}

/// Scheduler whose frames fire only when the host calls [`ManualSchedulerProbe::fire`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

fn lock_manual(state: &Mutex<ManualState>) -> MutexGuard<'_, ManualState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> ManualSchedulerProbe {
        ManualSchedulerProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, events: &EventSender) -> FrameToken {
        let mut st = lock_manual(&self.state);
        st.next += 1;
        let token = FrameToken(st.next);
        st.pending.push((token, events.clone()));
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut st = lock_manual(&self.state);
        let before = st.pending.len();
        st.pending.retain(|(t, _)| *t != token);
        if st.pending.len() != before {
            st.cancelled += 1;
        }
    }
}

/// Shared view of a [`ManualScheduler`].
#[derive(Debug, Clone)]
pub struct ManualSchedulerProbe {
    state: Arc<Mutex<ManualState>>,
}

impl ManualSchedulerProbe {
    /// Frames requested and neither fired nor cancelled.
    pub fn pending(&self) -> usize {
        lock_manual(&self.state).pending.len()
    }

    pub fn cancelled(&self) -> u64 {
        lock_manual(&self.state).cancelled
    }

    /// Deliver every pending frame. Returns how many fired.
    pub fn fire(&self) -> usize {
        let due = std::mem::take(&mut lock_manual(&self.state).pending);
        for (token, events) in &due {
            events.send(PlayerEvent::Frame(*token));
        }
        due.len()
    }
}

#[derive(Debug, Default)]
struct TickerSlot {
    armed: Option<(FrameToken, EventSender)>,
}

/// Scheduler that paces frames on a background thread at a fixed interval.
///
/// The thread is started on the first request and joined on drop.
pub struct TickerScheduler {
    interval: Duration,
    next: u64,
    slot: Arc<Mutex<TickerSlot>>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TickerScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next: 0,
            slot: Arc::new(Mutex::new(TickerSlot::default())),
            shutdown: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// ~60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }

    fn ensure_thread(&mut self) {
        if self.thread.is_some() {
            return;
        }
        let slot = Arc::clone(&self.slot);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let spawned = std::thread::Builder::new()
            .name("waveplay-frames".into())
            .spawn(move || {
                while !shutdown.load(Ordering::Acquire) {
                    std::thread::sleep(interval);
                    let due = slot
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .armed
                        .take();
                    if let Some((token, events)) = due {
                        events.send(PlayerEvent::Frame(token));
                    }
                }
            });
        match spawned {
            Ok(handle) => self.thread = Some(handle),
            Err(e) => tracing::warn!(error = %e, "failed to spawn frame ticker"),
        }
    }
}

impl FrameScheduler for TickerScheduler {
    fn request_frame(&mut self, events: &EventSender) -> FrameToken {
        self.ensure_thread();
        self.next += 1;
        let token = FrameToken(self.next);
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .armed = Some((token, events.clone()));
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.armed.as_ref().is_some_and(|(t, _)| *t == token) {
            slot.armed = None;
        }
    }
}

impl Drop for TickerScheduler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
