//! Waveplay is an audio playback and waveform visualization engine.
//!
//! An [`AudioPlayer`] decodes a selected file into PCM, rasterizes its waveform once, plays it
//! back through a [`PlaybackSink`] at an adjustable rate and redraws a playhead over the waveform
//! while playing or while the user drags to seek.
//!
//! The player is single-threaded. Decoders, sinks, surfaces and frame schedulers post
//! [`PlayerEvent`]s to a queue that the owner drains with [`AudioPlayer::pump`].
#![forbid(unsafe_code)]

pub mod decode;
pub mod foundation;
pub mod player;
pub mod render;
pub mod seek;
pub mod transport;
pub mod waveform;

pub use crate::foundation::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::foundation::core::{Rgba8, SurfaceSize};
pub use crate::foundation::error::{DecodeError, PlaybackSinkError, WaveplayError, WaveplayResult};

pub use crate::decode::adapter::{DecodeMode, Decoder, LoadRequestId, MediaHint};
pub use crate::decode::pcm::PcmBuffer;
#[cfg(feature = "symphonia")]
pub use crate::decode::symphonia::SymphoniaDecoder;
pub use crate::player::audio_player::{AudioPlayer, Notice, PlayerParts, PlayerStatus, PlayerView};
pub use crate::player::event::{EventSender, PlayerEvent};
pub use crate::player::opts::PlayerOpts;
pub use crate::render::compose::Theme;
pub use crate::render::frame_loop::{FrameScheduler, ManualScheduler, TickerScheduler};
pub use crate::render::surface::{PixmapSurface, Surface};
pub use crate::seek::coordinator::{PointerEvent, PointerPhase};
pub use crate::transport::controller::{SessionStats, TransportState};
pub use crate::transport::session::{MemorySink, PlaybackHandle, PlaybackSink, SessionStart};
pub use crate::waveform::raster::WaveformImage;
