use std::ops::Range;

use rayon::prelude::*;

/// Minimum and maximum sample value within one pixel column's window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnEnvelope {
    pub min: f32,
    pub max: f32,
}

impl ColumnEnvelope {
    /// Envelope of a window with no finite samples (drawn as silence).
    pub const SILENT: ColumnEnvelope = ColumnEnvelope { min: 0.0, max: 0.0 };
}

/// Sample range reduced into column `col` of `width`.
///
/// The `width` windows are contiguous and cover every sample: column `col` spans
/// `[col * n / width, (col + 1) * n / width)`. When there are fewer samples than columns, a column
/// whose span is empty takes the single sample under it, so no column is left blank.
pub fn window_bounds(col: u32, samples: usize, width: u32) -> Range<usize> {
    if samples == 0 || width == 0 {
        return 0..0;
    }
    let scale = |c: u32| (u128::from(c) * samples as u128 / u128::from(width)) as usize;
    let start = scale(col.min(width)).min(samples);
    let end = scale(col.saturating_add(1).min(width)).min(samples);
    if end > start {
        start..end
    } else {
        let idx = start.min(samples - 1);
        idx..idx + 1
    }
}

/// Reduce `samples` to one min/max pair per column.
///
/// Columns are reduced independently (in parallel), so the output does not depend on scheduling.
pub fn column_envelopes(samples: &[f32], width: u32) -> Vec<ColumnEnvelope> {
    (0..width)
        .into_par_iter()
        .map(|col| envelope_of(&samples[window_bounds(col, samples.len(), width)]))
        .collect()
}

fn envelope_of(window: &[f32]) -> ColumnEnvelope {
    let mut it = window.iter().copied().filter(|s| s.is_finite());
    let Some(first) = it.next() else {
        return ColumnEnvelope::SILENT;
    };
    let (min, max) = it.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    ColumnEnvelope { min, max }
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/envelope.rs"]
mod tests;
