//! Turning encoded audio bytes into PCM.

/// Decode requests, staleness tracking and the decoder trait.
pub mod adapter;
/// Decoded PCM buffers.
pub mod pcm;
/// Decoder backed by `symphonia`.
#[cfg(feature = "symphonia")]
pub mod symphonia;
