//! The audio player component and its configuration.

pub mod audio_player;
pub mod event;
pub mod opts;
