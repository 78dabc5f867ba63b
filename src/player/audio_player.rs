use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::decode::adapter::{DecodeAdapter, Decoder, LoadRequestId, MediaHint};
use crate::decode::pcm::{BufferId, PcmBuffer};
use crate::foundation::clock::Clock;
use crate::foundation::core::format_clock;
use crate::foundation::error::{DecodeError, PlaybackSinkError, WaveplayError, WaveplayResult};
use crate::player::event::{EventSender, PlayerEvent};
use crate::player::opts::PlayerOpts;
use crate::render::compose::{draw_empty, draw_frame};
use crate::render::frame_loop::{FrameScheduler, FrameToken, RenderLoop};
use crate::render::surface::{PointerSender, Surface, SubscriptionId};
use crate::seek::coordinator::{PointerEvent, SeekCoordinator, SeekOutcome, SurfaceSpan};
use crate::transport::controller::{SessionStats, TransportController, TransportState};
use crate::transport::session::PlaybackSink;
use crate::waveform::cache::{WaveformCache, WaveformCacheStats};
use crate::waveform::raster::WaveformImage;

/// Collaborators injected into an [`AudioPlayer`].
pub struct PlayerParts {
    pub decoder: Arc<dyn Decoder>,
    pub sink: Box<dyn PlaybackSink>,
    pub surface: Box<dyn Surface>,
    pub scheduler: Box<dyn FrameScheduler>,
    pub clock: Arc<dyn Clock>,
}

/// Load lifecycle of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Nothing loaded (initial state, or the last decode failed).
    Empty,
    /// A decode is in flight; playback requests are ignored.
    Loading,
    /// A buffer is loaded and playable.
    Ready,
}

/// Recoverable problem to show the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The selected file could not be decoded.
    DecodeFailed(String),
    /// Output is suspended until a user gesture; retry with [`AudioPlayer::retry_audio`].
    AudioSuspended,
    /// Output is unavailable.
    AudioUnavailable(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::DecodeFailed(reason) => format!("Could not decode audio file: {reason}"),
            Notice::AudioSuspended => "Tap to enable audio".to_owned(),
            Notice::AudioUnavailable(reason) => format!("Audio output unavailable: {reason}"),
        }
    }

    fn from_sink(err: &PlaybackSinkError) -> Self {
        match err {
            PlaybackSinkError::Suspended(_) => Notice::AudioSuspended,
            PlaybackSinkError::Unavailable(reason) => Notice::AudioUnavailable(reason.clone()),
        }
    }
}

/// Snapshot of everything the presentational layer needs to render controls.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub status: PlayerStatus,
    pub notice: Option<Notice>,
    /// Whether the play control should be offered.
    pub can_play: bool,
    pub is_playing: bool,
    pub is_dragging: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub rate: f64,
    pub rate_presets: Vec<f64>,
    /// `m:ss / m:ss`.
    pub time_label: String,
}

/// Audio playback and waveform component.
///
/// All methods run on the owning thread. Asynchronous signals (decode completion, session end,
/// pointer input, frame ticks) are queued by collaborators and applied by [`AudioPlayer::pump`].
pub struct AudioPlayer {
    opts: PlayerOpts,
    events: EventSender,
    inbox: mpsc::Receiver<PlayerEvent>,

    decode: DecodeAdapter,
    transport: TransportController,
    seek: SeekCoordinator,
    waveform: WaveformCache,
    frames: RenderLoop,

    scheduler: Box<dyn FrameScheduler>,
    surface: Box<dyn Surface>,
    pointer: Option<SubscriptionId>,

    track: Option<BufferId>,
    next_buffer: u64,
    status: PlayerStatus,
    notice: Option<Notice>,
}

impl AudioPlayer {
    pub fn new(parts: PlayerParts, opts: PlayerOpts) -> WaveplayResult<Self> {
        opts.validate()?;
        let (events, inbox) = EventSender::channel();
        let transport = TransportController::new(
            parts.clock,
            parts.sink,
            events.clone(),
            opts.initial_rate,
            opts.end_epsilon_secs,
        )?;
        let mut surface = parts.surface;
        let pointer = surface.subscribe_pointer(PointerSender::new(events.clone()));

        let mut player = Self {
            decode: DecodeAdapter::new(parts.decoder, opts.decode_mode),
            waveform: WaveformCache::new(opts.theme.waveform),
            opts,
            events,
            inbox,
            transport,
            seek: SeekCoordinator::new(),
            frames: RenderLoop::new(),
            scheduler: parts.scheduler,
            surface,
            pointer: Some(pointer),
            track: None,
            next_buffer: 0,
            status: PlayerStatus::Empty,
            notice: None,
        };
        player.redraw();
        Ok(player)
    }

    /// Start decoding a newly selected file.
    ///
    /// The current buffer, its waveform and any playback are discarded immediately; results of
    /// earlier pending loads will be ignored.
    pub fn load(&mut self, bytes: Vec<u8>, hint: MediaHint) -> LoadRequestId {
        self.seek.cancel();
        self.transport.unload();
        self.waveform.invalidate();
        self.track = None;
        self.status = PlayerStatus::Loading;
        self.notice = None;
        self.sync_render_loop();
        self.redraw();

        let request = self.decode.begin(bytes, hint, &self.events);
        tracing::debug!(request = request.0, "load requested");
        request
    }

    /// Read `path` and start decoding it, hinting the decoder with the file extension.
    pub fn load_path(&mut self, path: &Path) -> WaveplayResult<LoadRequestId> {
        let bytes = std::fs::read(path).map_err(|e| {
            WaveplayError::Other(
                anyhow::Error::new(e).context(format!("failed to read '{}'", path.display())),
            )
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.load(bytes, MediaHint::from_file_name(&name)))
    }

    /// Apply every queued event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.handle_event(event);
            n += 1;
        }
        n
    }

    /// Wait up to `timeout` for at least one event, then apply everything queued.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        match self.inbox.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Decoded { request, result } => self.on_decoded(request, result),
            PlayerEvent::SessionEnded(id) => {
                if self.transport.on_natural_end(id) {
                    self.sync_render_loop();
                }
            }
            PlayerEvent::Pointer(ev) => self.pointer(ev),
            PlayerEvent::Frame(token) => self.on_frame(token),
        }
    }

    pub fn play(&mut self) {
        let result = self.transport.play();
        self.absorb(result);
        self.sync_render_loop();
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.sync_render_loop();
    }

    pub fn toggle(&mut self) {
        if self.transport.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Change the playback rate; rejected when outside the configured bounds.
    pub fn set_rate(&mut self, rate: f64) -> WaveplayResult<()> {
        if !self.opts.rate_allowed(rate) {
            return Err(WaveplayError::validation(format!(
                "rate {rate} outside [{}, {}]",
                self.opts.min_rate, self.opts.max_rate
            )));
        }
        let result = self.transport.set_rate(rate);
        self.absorb(result);
        self.sync_render_loop();
        Ok(())
    }

    /// Jump to `secs` (clamped to the buffer).
    pub fn seek_to(&mut self, secs: f64) {
        let result = self.transport.seek(secs);
        self.absorb(result);
        if !self.transport.is_playing() {
            self.redraw();
        }
        self.sync_render_loop();
    }

    /// Feed one pointer event from the rendering surface.
    pub fn pointer(&mut self, event: PointerEvent) {
        let span = SurfaceSpan {
            left: self.surface.client_left(),
            width: f64::from(self.surface.size().width),
        };
        let outcome = match self.seek.handle(event, span, &mut self.transport) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.absorb(Err(e));
                SeekOutcome::Ignored
            }
        };
        if matches!(
            outcome,
            SeekOutcome::DragStarted { .. } | SeekOutcome::Dragged { .. }
        ) && !self.transport.is_playing()
        {
            self.redraw();
        }
        self.sync_render_loop();
    }

    /// Retry output after a suspended/unavailable notice (e.g. on a user tap).
    pub fn retry_audio(&mut self) {
        if matches!(
            self.notice,
            Some(Notice::AudioSuspended | Notice::AudioUnavailable(_))
        ) {
            self.notice = None;
        }
        self.play();
    }

    /// Draw one frame at the current position.
    pub fn redraw(&mut self) {
        let size = self.surface.size();
        if size.is_empty() {
            return;
        }
        let (Some(id), Some(pcm)) = (self.track, self.transport.buffer().cloned()) else {
            draw_empty(self.surface.as_mut(), &self.opts.theme);
            return;
        };
        let image = match self.waveform.get_or_render(id, &pcm, size) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "waveform rasterization failed");
                draw_empty(self.surface.as_mut(), &self.opts.theme);
                return;
            }
        };
        let progress = self.progress();
        draw_frame(self.surface.as_mut(), &image, progress, &self.opts.theme);
    }

    /// Cached waveform for the current buffer at the current surface size.
    pub fn waveform_image(&mut self) -> Option<Arc<WaveformImage>> {
        let size = self.surface.size();
        let id = self.track?;
        let pcm = self.transport.buffer()?.clone();
        if size.is_empty() {
            return None;
        }
        match self.waveform.get_or_render(id, &pcm, size) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "waveform rasterization failed");
                None
            }
        }
    }

    /// Write the current waveform image as PNG.
    pub fn export_waveform_png(&mut self, path: &Path) -> WaveplayResult<()> {
        let image = self.waveform_image().ok_or(WaveplayError::NoBuffer)?;
        image.save_png(path)
    }

    pub fn view(&self) -> PlayerView {
        let position = self.transport.current_position();
        let duration = self.transport.duration();
        PlayerView {
            status: self.status,
            notice: self.notice.clone(),
            can_play: self.status == PlayerStatus::Ready,
            is_playing: self.transport.is_playing(),
            is_dragging: self.seek.is_dragging(),
            position_secs: position,
            duration_secs: duration,
            rate: self.transport.rate(),
            rate_presets: self.opts.rate_presets.clone(),
            time_label: format!("{} / {}", format_clock(position), format_clock(duration)),
        }
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn current_position(&self) -> f64 {
        self.transport.current_position()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn is_dragging(&self) -> bool {
        self.seek.is_dragging()
    }

    pub fn is_render_loop_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn session_stats(&self) -> SessionStats {
        self.transport.stats()
    }

    pub fn waveform_stats(&self) -> WaveformCacheStats {
        self.waveform.stats()
    }

    pub fn opts(&self) -> &PlayerOpts {
        &self.opts
    }

    /// Handle collaborators can use to post events to this player.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    fn on_decoded(&mut self, request: LoadRequestId, result: Result<PcmBuffer, DecodeError>) {
        if !self.decode.accept(request) {
            tracing::debug!(request = request.0, "stale decode result discarded");
            return;
        }
        match result {
            Ok(pcm) => {
                self.next_buffer += 1;
                let id = BufferId(self.next_buffer);
                tracing::debug!(
                    buffer = id.0,
                    duration_secs = pcm.duration_secs(),
                    "audio loaded"
                );
                self.transport.load(Arc::new(pcm));
                self.track = Some(id);
                self.status = PlayerStatus::Ready;
                self.notice = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "error decoding audio data");
                self.status = PlayerStatus::Empty;
                self.notice = Some(Notice::DecodeFailed(e.to_string()));
            }
        }
        self.redraw();
    }

    fn on_frame(&mut self, token: FrameToken) {
        if !self.frames.on_frame(token) {
            return;
        }
        self.redraw();
        if self.loop_wanted() {
            self.frames
                .ensure_scheduled(self.scheduler.as_mut(), &self.events);
        }
    }

    fn loop_wanted(&self) -> bool {
        self.transport.is_playing() || self.seek.is_dragging()
    }

    /// Start the loop when playing or dragging; otherwise stop it and draw the settled frame.
    fn sync_render_loop(&mut self) {
        if self.loop_wanted() {
            self.frames
                .ensure_scheduled(self.scheduler.as_mut(), &self.events);
        } else if self.frames.stop(self.scheduler.as_mut()) {
            self.redraw();
        }
    }

    /// Translate a transport error into player state.
    fn absorb(&mut self, result: WaveplayResult<()>) {
        match result {
            Ok(()) => {
                if matches!(
                    self.notice,
                    Some(Notice::AudioSuspended | Notice::AudioUnavailable(_))
                ) && self.transport.is_playing()
                {
                    self.notice = None;
                }
            }
            Err(WaveplayError::NoBuffer) => {
                tracing::debug!("transport request ignored: no buffer loaded");
            }
            Err(WaveplayError::Sink(e)) => {
                tracing::warn!(error = %e, "playback sink failed");
                self.notice = Some(Notice::from_sink(&e));
            }
            Err(e) => {
                tracing::warn!(error = %e, "transport request failed");
            }
        }
    }

    fn progress(&self) -> f64 {
        let duration = self.transport.duration();
        if duration > 0.0 {
            self.transport.current_position() / duration
        } else {
            0.0
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.frames.stop(self.scheduler.as_mut());
        if let Some(id) = self.pointer.take() {
            self.surface.unsubscribe_pointer(id);
        }
        self.transport.teardown();
        tracing::debug!("audio player torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/audio_player.rs"]
mod tests;
