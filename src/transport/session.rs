use std::sync::{Arc, Mutex, MutexGuard};

use crate::decode::pcm::PcmBuffer;
use crate::foundation::error::PlaybackSinkError;
use crate::player::event::{EventSender, PlayerEvent};

/// Identity of one playback session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

/// Posts the natural-end notification for exactly one session.
#[derive(Debug, Clone)]
pub struct EndNotifier {
    session: SessionId,
    events: EventSender,
}

impl EndNotifier {
    pub(crate) fn new(session: SessionId, events: EventSender) -> Self {
        Self { session, events }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report that the session played to the end of its buffer on its own.
    pub fn notify(&self) {
        self.events.send(PlayerEvent::SessionEnded(self.session));
    }
}

/// Everything a sink needs to start sounding a buffer.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub id: SessionId,
    pub buffer: Arc<PcmBuffer>,
    /// Seconds into the buffer at which output begins.
    pub offset_secs: f64,
    /// Playback rate (> 0).
    pub rate: f64,
    pub on_end: EndNotifier,
}

/// A live session. Stopping must silence output synchronously.
pub trait PlaybackHandle {
    fn stop(&mut self);
}

/// Audio output collaborator.
///
/// A sink is the owner of the process-wide output context: it is initialised lazily by
/// [`PlaybackSink::ensure_running`] and torn down exactly once by [`PlaybackSink::shutdown`].
pub trait PlaybackSink {
    /// Lazily create or resume the output context.
    fn ensure_running(&mut self) -> Result<(), PlaybackSinkError> {
        Ok(())
    }

    /// Start sounding `start.buffer` from `start.offset_secs` at `start.rate`.
    fn start(&mut self, start: SessionStart) -> Result<Box<dyn PlaybackHandle>, PlaybackSinkError>;

    /// Release the output context. Called once when the owning player is dropped.
    fn shutdown(&mut self) {}
}

/// One session as observed by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub offset_secs: f64,
    pub rate: f64,
    pub stopped: bool,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    suspended: bool,
    running: bool,
    shut_down: bool,
    records: Vec<SessionRecord>,
    notifiers: Vec<EndNotifier>,
    started: usize,
    max_live: usize,
}

impl MemorySinkState {
    fn live(&self) -> usize {
        self.records.iter().filter(|r| !r.stopped).count()
    }

    /// Forget the oldest stopped sessions beyond the retained history.
    fn prune(&mut self) {
        let stopped = self.records.iter().filter(|r| r.stopped).count();
        let excess = stopped.saturating_sub(MemorySink::RETAINED_STOPPED_SESSIONS);
        if excess == 0 {
            return;
        }
        let mut dropped = Vec::with_capacity(excess);
        self.records.retain(|r| {
            if r.stopped && dropped.len() < excess {
                dropped.push(r.id);
                false
            } else {
                true
            }
        });
        self.notifiers.retain(|n| !dropped.contains(&n.session()));
    }
}

fn lock(state: &Mutex<MemorySinkState>) -> MutexGuard<'_, MemorySinkState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sink that produces no sound and records sessions, for tests and headless hosts.
///
/// Live sessions are always kept. Only the most recent
/// [`MemorySink::RETAINED_STOPPED_SESSIONS`] stopped sessions stay inspectable (and can still fire
/// a late end notification), so long seek-heavy runs use bounded memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySink {
    pub const RETAINED_STOPPED_SESSIONS: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting and driving the sink after it is moved into a player.
    pub fn probe(&self) -> MemorySinkProbe {
        MemorySinkProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl PlaybackSink for MemorySink {
    fn ensure_running(&mut self) -> Result<(), PlaybackSinkError> {
        let mut st = lock(&self.state);
        if st.shut_down {
            return Err(PlaybackSinkError::Unavailable(
                "output context was shut down".to_owned(),
            ));
        }
        if st.suspended {
            return Err(PlaybackSinkError::Suspended(
                "output is waiting for a user gesture".to_owned(),
            ));
        }
        st.running = true;
        Ok(())
    }

    fn start(&mut self, start: SessionStart) -> Result<Box<dyn PlaybackHandle>, PlaybackSinkError> {
        let mut st = lock(&self.state);
        if !st.running {
            return Err(PlaybackSinkError::Unavailable(
                "output context is not running".to_owned(),
            ));
        }
        st.records.push(SessionRecord {
            id: start.id,
            offset_secs: start.offset_secs,
            rate: start.rate,
            stopped: false,
        });
        st.notifiers.push(start.on_end);
        st.started += 1;
        st.max_live = st.max_live.max(st.live());
        Ok(Box::new(MemoryHandle {
            id: start.id,
            state: Arc::clone(&self.state),
        }))
    }

    fn shutdown(&mut self) {
        let mut st = lock(&self.state);
        st.running = false;
        st.shut_down = true;
    }
}

struct MemoryHandle {
    id: SessionId,
    state: Arc<Mutex<MemorySinkState>>,
}

impl PlaybackHandle for MemoryHandle {
    fn stop(&mut self) {
        let mut st = lock(&self.state);
        if let Some(rec) = st.records.iter_mut().find(|r| r.id == self.id) {
            rec.stopped = true;
        }
        st.prune();
    }
}

/// Shared view of a [`MemorySink`].
#[derive(Debug, Clone)]
pub struct MemorySinkProbe {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySinkProbe {
    /// Simulate an output that refuses to start until a user gesture.
    pub fn set_suspended(&self, suspended: bool) {
        lock(&self.state).suspended = suspended;
    }

    /// Live sessions and the retained stopped ones, oldest first.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        lock(&self.state).records.clone()
    }

    /// Sessions started over the sink's lifetime, including pruned ones.
    pub fn started(&self) -> usize {
        lock(&self.state).started
    }

    pub fn live(&self) -> usize {
        lock(&self.state).live()
    }

    /// Highest number of simultaneously live sessions ever observed.
    pub fn max_live(&self) -> usize {
        lock(&self.state).max_live
    }

    pub fn is_shut_down(&self) -> bool {
        lock(&self.state).shut_down
    }

    /// Fire the natural-end notification of session `id`, as a real output would.
    pub fn finish(&self, id: SessionId) -> bool {
        let st = lock(&self.state);
        match st.notifiers.iter().find(|n| n.session() == id) {
            Some(n) => {
                n.notify();
                true
            }
            None => false,
        }
    }

    /// Fire the natural-end notification of the most recent live session.
    pub fn finish_live(&self) -> Option<SessionId> {
        let id = {
            let st = lock(&self.state);
            st.records.iter().rev().find(|r| !r.stopped).map(|r| r.id)
        }?;
        self.finish(id);
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/session.rs"]
mod tests;
