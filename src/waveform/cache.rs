use std::sync::Arc;

use crate::decode::pcm::{BufferId, PcmBuffer};
use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::WaveplayResult;
use crate::waveform::raster::{WaveformImage, rasterize};

/// What a cached waveform image was rendered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaveformKey {
    pub buffer: BufferId,
    pub size: SurfaceSize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveformCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Single-entry cache for the waveform image.
///
/// The entry is replaced whenever the buffer identity or the surface size changes.
#[derive(Debug)]
pub struct WaveformCache {
    color: Rgba8,
    entry: Option<(WaveformKey, Arc<WaveformImage>)>,
    stats: WaveformCacheStats,
}

impl WaveformCache {
    pub fn new(color: Rgba8) -> Self {
        Self {
            color,
            entry: None,
            stats: WaveformCacheStats::default(),
        }
    }

    /// Return the cached image for `(buffer, size)`, rasterizing on a miss.
    pub fn get_or_render(
        &mut self,
        buffer: BufferId,
        pcm: &PcmBuffer,
        size: SurfaceSize,
    ) -> WaveplayResult<Arc<WaveformImage>> {
        let key = WaveformKey { buffer, size };
        if let Some((cached_key, image)) = &self.entry
            && *cached_key == key
        {
            self.stats.hits += 1;
            return Ok(Arc::clone(image));
        }

        self.stats.misses += 1;
        let image = Arc::new(rasterize(pcm, size.width, size.height, self.color)?);
        tracing::debug!(buffer = buffer.0, width = size.width, height = size.height, "waveform rasterized");
        self.entry = Some((key, Arc::clone(&image)));
        Ok(image)
    }

    /// Drop the cached image (e.g. when the buffer is discarded).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn key(&self) -> Option<WaveformKey> {
        self.entry.as_ref().map(|(k, _)| *k)
    }

    pub fn stats(&self) -> WaveformCacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/cache.rs"]
mod tests;
