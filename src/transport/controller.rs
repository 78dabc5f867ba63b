use std::sync::Arc;

use crate::decode::pcm::PcmBuffer;
use crate::foundation::clock::Clock;
use crate::foundation::error::{WaveplayError, WaveplayResult};
use crate::player::event::EventSender;
use crate::transport::session::{
    EndNotifier, PlaybackHandle, PlaybackSink, SessionId, SessionStart,
};

/// Transport state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    Stopped,
    Playing,
}

/// Observable transport state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportState {
    /// Current playback position in seconds (live while playing).
    pub offset: f64,
    pub is_playing: bool,
    pub rate: f64,
    /// Duration of the loaded buffer; 0 when nothing is loaded.
    pub duration: f64,
}

/// Session creation/destruction counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub started: u64,
    pub stopped: u64,
}

impl SessionStats {
    pub fn live(&self) -> u64 {
        self.started.saturating_sub(self.stopped)
    }
}

struct LiveSession {
    id: SessionId,
    handle: Box<dyn PlaybackHandle>,
    started_at: f64,
    start_offset: f64,
    rate: f64,
}

/// Owns playback position, rate and the single live playback session.
///
/// Invariants: `0 <= offset <= duration` after every public call; at most one session is live and
/// a live session exists iff the status is [`TransportStatus::Playing`].
pub struct TransportController {
    clock: Arc<dyn Clock>,
    sink: Box<dyn PlaybackSink>,
    events: EventSender,
    end_epsilon: f64,

    buffer: Option<Arc<PcmBuffer>>,
    duration: f64,
    offset: f64,
    rate: f64,

    live: Option<LiveSession>,
    next_session: u64,
    stats: SessionStats,
}

impl TransportController {
    pub fn new(
        clock: Arc<dyn Clock>,
        sink: Box<dyn PlaybackSink>,
        events: EventSender,
        initial_rate: f64,
        end_epsilon: f64,
    ) -> WaveplayResult<Self> {
        validate_rate(initial_rate)?;
        Ok(Self {
            clock,
            sink,
            events,
            end_epsilon: end_epsilon.max(0.0),
            buffer: None,
            duration: 0.0,
            offset: 0.0,
            rate: initial_rate,
            live: None,
            next_session: 0,
            stats: SessionStats::default(),
        })
    }

    /// Replace the loaded buffer. Stops playback and rewinds to 0.
    pub fn load(&mut self, buffer: Arc<PcmBuffer>) {
        self.stop_session();
        self.duration = buffer.duration_secs();
        self.buffer = Some(buffer);
        self.offset = 0.0;
    }

    /// Discard the loaded buffer. Stops playback.
    pub fn unload(&mut self) {
        self.stop_session();
        self.buffer = None;
        self.duration = 0.0;
        self.offset = 0.0;
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&Arc<PcmBuffer>> {
        self.buffer.as_ref()
    }

    pub fn status(&self) -> TransportStatus {
        if self.live.is_some() {
            TransportStatus::Playing
        } else {
            TransportStatus::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.live.is_some()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn live_session(&self) -> Option<SessionId> {
        self.live.as_ref().map(|s| s.id)
    }

    pub fn state(&self) -> TransportState {
        TransportState {
            offset: self.current_position(),
            is_playing: self.is_playing(),
            rate: self.rate,
            duration: self.duration,
        }
    }

    /// Current position in seconds; never exceeds the duration.
    pub fn current_position(&self) -> f64 {
        match &self.live {
            None => self.offset,
            Some(s) => self.position_of(s),
        }
    }

    fn position_of(&self, s: &LiveSession) -> f64 {
        let elapsed = (self.clock.now_secs() - s.started_at).max(0.0);
        (s.start_offset + elapsed * s.rate).clamp(0.0, self.duration)
    }

    /// Start playing from the stored offset. No-op when already playing.
    ///
    /// An offset at (or within epsilon of) the end wraps to 0 first.
    pub fn play(&mut self) -> WaveplayResult<()> {
        if self.buffer.is_none() {
            return Err(WaveplayError::NoBuffer);
        }
        if self.live.is_some() {
            return Ok(());
        }
        if self.offset >= self.duration - self.end_epsilon {
            self.offset = 0.0;
        }
        self.start_session(self.offset, self.rate)?;
        tracing::debug!(offset = self.offset, rate = self.rate, "transport playing");
        Ok(())
    }

    /// Freeze the position and stop the session. No-op when stopped.
    pub fn pause(&mut self) {
        let Some(s) = &self.live else {
            return;
        };
        self.offset = self.position_of(s);
        self.stop_session();
        tracing::debug!(offset = self.offset, "transport paused");
    }

    /// Change rate. While playing, the session is swapped at the current position without the
    /// status ever reporting `Stopped`.
    pub fn set_rate(&mut self, rate: f64) -> WaveplayResult<()> {
        validate_rate(rate)?;
        if let Some(s) = &self.live {
            let pos = self.position_of(s);
            self.rate = rate;
            self.restart_at(pos)
        } else {
            self.rate = rate;
            Ok(())
        }
    }

    /// Move to `secs` (clamped to `[0, duration]`). While playing, the session is restarted there.
    pub fn seek(&mut self, secs: f64) -> WaveplayResult<()> {
        if self.buffer.is_none() {
            return Err(WaveplayError::NoBuffer);
        }
        let target = if secs.is_finite() {
            secs.clamp(0.0, self.duration)
        } else {
            0.0
        };
        if self.live.is_some() {
            self.restart_at(target)
        } else {
            self.offset = target;
            Ok(())
        }
    }

    /// Natural end of session `id`. Stale notifications (from sessions already replaced or
    /// stopped) are ignored. Returns whether the transport changed.
    pub fn on_natural_end(&mut self, id: SessionId) -> bool {
        if self.live_session() != Some(id) {
            tracing::trace!(session = id.0, "stale session end ignored");
            return false;
        }
        self.stop_session();
        self.offset = 0.0;
        tracing::debug!(session = id.0, "playback reached end");
        true
    }

    /// Stop output and release the sink's context.
    pub fn teardown(&mut self) {
        self.stop_session();
        self.sink.shutdown();
    }

    fn restart_at(&mut self, pos: f64) -> WaveplayResult<()> {
        self.offset = pos;
        self.start_session(pos, self.rate)
    }

    /// Start a session at `offset`. Any live session is stopped first. On failure the transport
    /// is left stopped at `offset`.
    fn start_session(&mut self, offset: f64, rate: f64) -> WaveplayResult<()> {
        self.stop_session();
        self.offset = offset;
        let Some(buffer) = self.buffer.clone() else {
            return Err(WaveplayError::NoBuffer);
        };

        self.sink.ensure_running()?;
        self.next_session += 1;
        let id = SessionId(self.next_session);
        let handle = self.sink.start(SessionStart {
            id,
            buffer,
            offset_secs: offset,
            rate,
            on_end: EndNotifier::new(id, self.events.clone()),
        })?;
        self.stats.started += 1;
        self.live = Some(LiveSession {
            id,
            handle,
            started_at: self.clock.now_secs(),
            start_offset: offset,
            rate,
        });
        Ok(())
    }

    fn stop_session(&mut self) {
        if let Some(mut s) = self.live.take() {
            s.handle.stop();
            self.stats.stopped += 1;
        }
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        self.stop_session();
    }
}

fn validate_rate(rate: f64) -> WaveplayResult<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(WaveplayError::validation(format!(
            "playback rate must be finite and > 0, got {rate}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/transport/controller.rs"]
mod tests;
