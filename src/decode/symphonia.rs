use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::decode::adapter::{Decoder, MediaHint};
use crate::decode::pcm::PcmBuffer;
use crate::foundation::error::DecodeError;

/// [`Decoder`] backed by Symphonia's default format and codec registries.
///
/// Decodes the first audio track of the container into planar `f32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for SymphoniaDecoder {
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn decode(&self, bytes: &[u8], hint: &MediaHint) -> Result<PcmBuffer, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
        let mut probe_hint = Hint::new();
        if let Some(ext) = hint.extension.as_deref() {
            probe_hint.with_extension(ext);
        }
        if let Some(mime) = hint.mime.as_deref().filter(|m| !m.ends_with("/*")) {
            probe_hint.mime_type(mime);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unrecognized(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unrecognized("no audio track found".to_owned()))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unrecognized(e.to_string()))?;

        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channel_count = track
            .codec_params
            .channels
            .map(|c| c.count())
            .unwrap_or(0);
        let mut interleaved = Vec::<f32>::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => {
                    skipped_packets += 1;
                    tracing::debug!(msg, "skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channel_count = spec.channels.count();
            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }

        if skipped_packets > 0 {
            tracing::warn!(skipped_packets, "some packets could not be decoded");
        }
        let channels = u16::try_from(channel_count)
            .map_err(|_| DecodeError::Corrupt(format!("unsupported channel count {channel_count}")))?;
        let pcm = PcmBuffer::from_interleaved(sample_rate, channels, &interleaved)?;
        tracing::debug!(
            sample_rate = pcm.sample_rate(),
            channels = pcm.channel_count(),
            duration_secs = pcm.duration_secs(),
            "decoded audio"
        );
        Ok(pcm)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/symphonia.rs"]
mod tests;
