/// Convenience result type used across waveplay.
pub type WaveplayResult<T> = Result<T, WaveplayError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum WaveplayError {
    /// Invalid caller-provided data (rates, sizes, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// A transport operation was attempted with no decoded buffer loaded.
    #[error("no audio buffer is loaded")]
    NoBuffer,

    /// The decoder collaborator rejected the input bytes.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The playback sink could not start or resume output.
    #[error(transparent)]
    Sink(#[from] PlaybackSinkError),

    /// Errors when serializing or deserializing options.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaveplayError {
    /// Build a [`WaveplayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WaveplayError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure to turn a byte buffer into PCM.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input byte buffer was empty.
    #[error("decode error: input is empty")]
    Empty,
    /// The bytes are not a container/codec the decoder understands.
    #[error("decode error: unrecognized audio data: {0}")]
    Unrecognized(String),
    /// The container was recognized but the stream is damaged or has no samples.
    #[error("decode error: corrupt audio data: {0}")]
    Corrupt(String),
    /// The decoder could not be run at all.
    #[error("decode error: decoder unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the audio output collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSinkError {
    /// Output exists but is suspended until a user gesture resumes it.
    #[error("playback sink suspended: {0}")]
    Suspended(String),
    /// Output is not available at all.
    #[error("playback sink unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
