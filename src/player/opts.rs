use std::path::Path;

use crate::decode::adapter::DecodeMode;
use crate::foundation::error::{WaveplayError, WaveplayResult};
use crate::render::compose::Theme;

/// Player configuration.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerOpts {
    /// `play()` wraps to 0 when the stored offset is within this many seconds of the end.
    pub end_epsilon_secs: f64,
    pub initial_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    /// Rates offered to the presentational layer.
    pub rate_presets: Vec<f64>,
    pub decode_mode: DecodeMode,
    pub theme: Theme,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            end_epsilon_secs: 1e-3,
            initial_rate: 1.0,
            min_rate: 0.25,
            max_rate: 4.0,
            rate_presets: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0],
            decode_mode: DecodeMode::Background,
            theme: Theme::default(),
        }
    }
}

impl PlayerOpts {
    /// Parse and validate options from JSON.
    pub fn from_json_str(s: &str) -> WaveplayResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| WaveplayError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read, parse and validate options from a JSON file.
    pub fn from_path(path: &Path) -> WaveplayResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            WaveplayError::Other(anyhow::Error::new(e).context(format!(
                "failed to read player options '{}'",
                path.display()
            )))
        })?;
        Self::from_json_str(&s)
    }

    pub fn to_json_string(&self) -> WaveplayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WaveplayError::serde(e.to_string()))
    }

    pub fn validate(&self) -> WaveplayResult<()> {
        if !(self.end_epsilon_secs.is_finite() && self.end_epsilon_secs >= 0.0) {
            return Err(WaveplayError::validation(
                "end_epsilon_secs must be finite and >= 0",
            ));
        }
        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            return Err(WaveplayError::validation("min_rate must be finite and > 0"));
        }
        if !(self.max_rate.is_finite() && self.max_rate >= self.min_rate) {
            return Err(WaveplayError::validation(
                "max_rate must be finite and >= min_rate",
            ));
        }
        if !self.rate_allowed(self.initial_rate) {
            return Err(WaveplayError::validation(
                "initial_rate must lie within [min_rate, max_rate]",
            ));
        }
        if let Some(bad) = self.rate_presets.iter().find(|r| !self.rate_allowed(**r)) {
            return Err(WaveplayError::validation(format!(
                "rate preset {bad} lies outside [min_rate, max_rate]"
            )));
        }
        if !(self.theme.playhead_width.is_finite() && self.theme.playhead_width > 0.0) {
            return Err(WaveplayError::validation(
                "theme.playhead_width must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub fn rate_allowed(&self, rate: f64) -> bool {
        rate.is_finite() && rate >= self.min_rate && rate <= self.max_rate
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/opts.rs"]
mod tests;
