use std::borrow::Cow;

use crate::foundation::error::DecodeError;

/// Identity of one loaded [`PcmBuffer`], assigned by its owner on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// Decoded, immutable PCM audio in planar (per-channel) layout.
///
/// A buffer always holds at least one channel and at least one frame, so its duration is positive.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl PcmBuffer {
    /// Build from planar channel data. All channels must have the same, non-zero length.
    pub fn from_planar(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::Corrupt("sample rate must be > 0".to_owned()));
        }
        let Some(first) = channels.first() else {
            return Err(DecodeError::Corrupt("no audio channels".to_owned()));
        };
        let frames = first.len();
        if frames == 0 {
            return Err(DecodeError::Corrupt("stream contains no samples".to_owned()));
        }
        if channels.iter().any(|c| c.len() != frames) {
            return Err(DecodeError::Corrupt(
                "channel sample counts disagree".to_owned(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
            frames,
        })
    }

    /// Build from interleaved samples. Trailing samples that do not fill a whole frame are dropped.
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: u16,
        interleaved: &[f32],
    ) -> Result<Self, DecodeError> {
        let n = usize::from(channel_count);
        if n == 0 {
            return Err(DecodeError::Corrupt("no audio channels".to_owned()));
        }
        let frames = interleaved.len() / n;
        let mut channels = vec![Vec::with_capacity(frames); n];
        for frame in interleaved.chunks_exact(n) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::from_planar(sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channel(&self, idx: usize) -> Option<&[f32]> {
        self.channels.get(idx).map(Vec::as_slice)
    }

    /// Duration in seconds: `frames / sample_rate`.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    /// Single representative channel: the sample-wise mean across channels.
    ///
    /// Mono buffers are borrowed without copying.
    pub fn downmix(&self) -> Cow<'_, [f32]> {
        if let [only] = self.channels.as_slice() {
            return Cow::Borrowed(only.as_slice());
        }
        let scale = 1.0 / self.channels.len() as f32;
        let mut out = vec![0.0f32; self.frames];
        for ch in &self.channels {
            for (o, &s) in out.iter_mut().zip(ch) {
                *o += s;
            }
        }
        for o in &mut out {
            *o *= scale;
        }
        Cow::Owned(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/pcm.rs"]
mod tests;
