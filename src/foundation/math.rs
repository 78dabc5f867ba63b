pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Map an amplitude in `[-1, 1]` to a row coordinate in `[0, height]`: `(1 + v) * height / 2`.
pub(crate) fn amplitude_to_y(v: f32, height: u32) -> f64 {
    let v = f64::from(v).clamp(-1.0, 1.0);
    (1.0 + v) * f64::from(height) / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
