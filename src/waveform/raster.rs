use std::path::Path;

use crate::decode::pcm::PcmBuffer;
use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::{WaveplayError, WaveplayResult};
use crate::foundation::math::amplitude_to_y;
use crate::waveform::envelope::column_envelopes;

/// Static waveform raster (straight-alpha RGBA8, transparent background).
///
/// Immutable once produced; shared between redraws through `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformImage {
    pixels: image::RgbaImage,
}

impl WaveformImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|p| Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Tightly packed row-major RGBA8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Write the image as PNG.
    pub fn save_png(&self, path: &Path) -> WaveplayResult<()> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| {
                WaveplayError::Other(anyhow::Error::new(e).context(format!(
                    "failed to write waveform png '{}'",
                    path.display()
                )))
            })
    }
}

/// Render the min/max envelope of `pcm` into a `width x height` image.
///
/// Multi-channel buffers are down-mixed to their mean first. Column `x` gets a vertical segment
/// spanning rows `(1 + min) * height / 2` to `(1 + max) * height / 2` of its window, at least one
/// pixel tall. The output depends only on `(pcm, width, height, color)`.
#[tracing::instrument(skip(pcm), fields(frames = pcm.frames(), channels = pcm.channel_count()))]
pub fn rasterize(
    pcm: &PcmBuffer,
    width: u32,
    height: u32,
    color: Rgba8,
) -> WaveplayResult<WaveformImage> {
    let size = SurfaceSize::new(width, height)?;
    let mono = pcm.downmix();
    let columns = column_envelopes(&mono, size.width);

    let mut pixels = image::RgbaImage::new(size.width, size.height);
    let px = image::Rgba(color.to_array());
    for (x, env) in columns.iter().enumerate() {
        let (row0, row1) = column_rows(env.min, env.max, size.height);
        for y in row0..row1 {
            pixels.put_pixel(x as u32, y, px);
        }
    }
    Ok(WaveformImage { pixels })
}

/// Half-open row span for one column, clamped to the image and never empty.
fn column_rows(min: f32, max: f32, height: u32) -> (u32, u32) {
    let y0 = amplitude_to_y(min, height);
    let y1 = amplitude_to_y(max, height);
    let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
    let last = height.saturating_sub(1);
    let row0 = (lo.floor() as u32).min(last);
    let row1 = (hi.ceil() as u32).clamp(row0 + 1, height);
    (row0, row1)
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/raster.rs"]
mod tests;
