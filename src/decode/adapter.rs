use std::sync::Arc;

use crate::decode::pcm::PcmBuffer;
use crate::foundation::error::DecodeError;
use crate::player::event::{EventSender, PlayerEvent};

/// Hint forwarded to the decoder to help container probing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaHint {
    /// File extension without the dot (`"wav"`, `"mp3"`), if known.
    pub extension: Option<String>,
    /// MIME type or accept filter, e.g. `"audio/mpeg"` or `"audio/*"`.
    pub mime: Option<String>,
}

impl Default for MediaHint {
    fn default() -> Self {
        Self {
            extension: None,
            mime: Some("audio/*".to_owned()),
        }
    }
}

impl MediaHint {
    /// Derive a hint from a file name (`"take.flac"` -> extension `flac`).
    pub fn from_file_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());
        Self {
            extension,
            ..Self::default()
        }
    }
}

/// External audio-decoding capability.
///
/// Implementations must not retain `bytes` past the call.
pub trait Decoder: Send + Sync {
    /// Decode a complete in-memory file into PCM.
    fn decode(&self, bytes: &[u8], hint: &MediaHint) -> Result<PcmBuffer, DecodeError>;
}

/// Identity of one `load` call; used to discard results of superseded requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadRequestId(pub u64);

/// Where decode work runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Decode on a dedicated worker thread.
    #[default]
    Background,
    /// Decode on the calling thread. The result is still delivered through the event queue.
    Inline,
}

/// Tracks decode requests and enforces "latest request wins".
pub struct DecodeAdapter {
    decoder: Arc<dyn Decoder>,
    mode: DecodeMode,
    next_request: u64,
    pending: Option<LoadRequestId>,
}

impl DecodeAdapter {
    pub fn new(decoder: Arc<dyn Decoder>, mode: DecodeMode) -> Self {
        Self {
            decoder,
            mode,
            next_request: 0,
            pending: None,
        }
    }

    /// Start decoding `bytes`. Any earlier pending request is superseded.
    ///
    /// The outcome arrives later as [`PlayerEvent::Decoded`] on `events`.
    pub fn begin(&mut self, bytes: Vec<u8>, hint: MediaHint, events: &EventSender) -> LoadRequestId {
        self.next_request += 1;
        let request = LoadRequestId(self.next_request);
        if let Some(prev) = self.pending.replace(request) {
            tracing::debug!(superseded = prev.0, request = request.0, "decode superseded");
        }

        match self.mode {
            DecodeMode::Inline => {
                let result = run_decode(self.decoder.as_ref(), bytes, &hint);
                events.send(PlayerEvent::Decoded { request, result });
            }
            DecodeMode::Background => {
                let decoder = Arc::clone(&self.decoder);
                let worker_events = events.clone();
                let spawned = std::thread::Builder::new()
                    .name(format!("waveplay-decode-{}", request.0))
                    .spawn(move || {
                        let result = run_decode(decoder.as_ref(), bytes, &hint);
                        worker_events.send(PlayerEvent::Decoded { request, result });
                    });
                if let Err(e) = spawned {
                    tracing::warn!(error = %e, "failed to spawn decode worker");
                    events.send(PlayerEvent::Decoded {
                        request,
                        result: Err(DecodeError::Unavailable(format!(
                            "failed to spawn decode worker: {e}"
                        ))),
                    });
                }
            }
        }
        request
    }

    /// Accept a completed request if it is the latest pending one.
    ///
    /// Returns `false` for stale or unknown requests, whose results must be dropped.
    pub fn accept(&mut self, request: LoadRequestId) -> bool {
        if self.pending == Some(request) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Forget the pending request, if any; its result will be treated as stale.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<LoadRequestId> {
        self.pending
    }
}

fn run_decode(
    decoder: &dyn Decoder,
    bytes: Vec<u8>,
    hint: &MediaHint,
) -> Result<PcmBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let result = decoder.decode(&bytes, hint);
    drop(bytes);
    result
}

#[cfg(test)]
#[path = "../../tests/unit/decode/adapter.rs"]
mod tests;
