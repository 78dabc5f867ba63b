use crate::foundation::error::{WaveplayError, WaveplayResult};
use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Line, Point, Rect};

/// Pixel dimensions of a rendering surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Build a size, rejecting zero-area surfaces.
    pub fn new(width: u32, height: u32) -> WaveplayResult<Self> {
        if width == 0 || height == 0 {
            return Err(WaveplayError::validation(
                "surface width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Whether the surface has no drawable pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Straight-alpha RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Source-over composite `self` onto `dst` (both straight alpha).
    pub fn over(self, dst: Rgba8) -> Rgba8 {
        if self.a == 255 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let sa = u16::from(self.a);
        let inv = 255 - sa;
        let da = u16::from(dst.a);
        let out_a = sa + u16::from(mul_div255_u8(da, inv));
        if out_a == 0 {
            return Rgba8::transparent();
        }
        let ch = |s: u8, d: u8| -> u8 {
            let s_p = u32::from(s) * u32::from(sa);
            let d_p = u32::from(mul_div255_u8(u16::from(d), da)) * u32::from(inv);
            (((s_p + d_p) + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8
        };
        Rgba8 {
            r: ch(self.r, dst.r),
            g: ch(self.g, dst.g),
            b: ch(self.b, dst.b),
            a: out_a.min(255) as u8,
        }
    }
}

/// Clamp `v` into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Format seconds as `m:ss` (negative and non-finite inputs format as `0:00`).
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
