use crate::foundation::core::{Line, Point, Rect, Rgba8, clamp_unit};
use crate::render::surface::Surface;
use crate::waveform::raster::WaveformImage;

/// Colours and stroke widths used when drawing frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Rgba8,
    pub waveform: Rgba8,
    /// Tint laid over the already-played region (left of the playhead).
    pub played_tint: Rgba8,
    /// Dimming laid over the unplayed region (right of the playhead).
    pub unplayed_dim: Rgba8,
    pub playhead: Rgba8,
    pub playhead_width: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(17, 24, 39),
            waveform: Rgba8::opaque(148, 163, 184),
            played_tint: Rgba8::new(59, 130, 246, 110),
            unplayed_dim: Rgba8::new(0, 0, 0, 90),
            playhead: Rgba8::opaque(248, 250, 252),
            playhead_width: 2.0,
        }
    }
}

/// Horizontal pixel coordinate of the playhead for `progress` in `[0, 1]`.
pub fn playhead_x(progress: f64, width: u32) -> f64 {
    clamp_unit(progress) * f64::from(width)
}

/// Draw one frame: background, cached waveform, played/unplayed overlays and the playhead.
pub fn draw_frame(surface: &mut dyn Surface, waveform: &WaveformImage, progress: f64, theme: &Theme) {
    let size = surface.size();
    if size.is_empty() {
        return;
    }
    let w = f64::from(size.width);
    let h = f64::from(size.height);
    let x = playhead_x(progress, size.width);

    surface.fill_rect(Rect::new(0.0, 0.0, w, h), theme.background);
    surface.blit(waveform, Point::ORIGIN);
    if x > 0.0 {
        surface.fill_rect(Rect::new(0.0, 0.0, x, h), theme.played_tint);
    }
    if x < w {
        surface.fill_rect(Rect::new(x, 0.0, w, h), theme.unplayed_dim);
    }
    surface.stroke_line(
        Line::new(Point::new(x, 0.0), Point::new(x, h)),
        theme.playhead_width,
        theme.playhead,
    );
}

/// Draw the idle state (nothing loaded): background only.
pub fn draw_empty(surface: &mut dyn Surface, theme: &Theme) {
    let size = surface.size();
    if size.is_empty() {
        return;
    }
    surface.fill_rect(
        Rect::new(0.0, 0.0, f64::from(size.width), f64::from(size.height)),
        theme.background,
    );
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
