use std::sync::mpsc;

use crate::decode::adapter::LoadRequestId;
use crate::decode::pcm::PcmBuffer;
use crate::foundation::error::DecodeError;
use crate::render::frame_loop::FrameToken;
use crate::seek::coordinator::PointerEvent;
use crate::transport::session::SessionId;

/// Asynchronous signal delivered to the player on its owning thread.
///
/// Collaborators never call back into the player directly; they post events, and
/// [`crate::AudioPlayer::pump`] dispatches them one at a time.
#[derive(Debug)]
pub enum PlayerEvent {
    /// A decode request finished (successfully or not).
    Decoded {
        /// Identity of the request that produced this result.
        request: LoadRequestId,
        /// Decoded PCM or the decoder's rejection.
        result: Result<PcmBuffer, DecodeError>,
    },
    /// A playback session reached the end of its buffer unassisted.
    SessionEnded(SessionId),
    /// Pointer input on the rendering surface.
    Pointer(PointerEvent),
    /// A previously requested animation frame is due.
    Frame(FrameToken),
}

impl PlayerEvent {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerEvent::Decoded { .. } => "decoded",
            PlayerEvent::SessionEnded(_) => "session_ended",
            PlayerEvent::Pointer(_) => "pointer",
            PlayerEvent::Frame(_) => "frame",
        }
    }
}

/// Cloneable handle collaborators use to post [`PlayerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<PlayerEvent>,
}

impl EventSender {
    /// Create a sender and the receiving end of a fresh event queue.
    pub fn channel() -> (Self, mpsc::Receiver<PlayerEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Post an event. Events sent after the player is dropped are discarded.
    pub fn send(&self, event: PlayerEvent) {
        if let Err(mpsc::SendError(ev)) = self.tx.send(event) {
            tracing::trace!(event = ev.kind(), "player gone; event discarded");
        }
    }
}
