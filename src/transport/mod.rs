//! Playback position, rate and session lifecycle.

pub mod controller;
/// Playback sink collaborator and the in-memory sink.
pub mod session;
