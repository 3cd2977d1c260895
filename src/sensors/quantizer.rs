//! Absorbance ⇄ output-byte scaling.
//!
//! A single linear factor (`max_output_value / max_expected_absorbance`)
//! maps absorbance onto the integer output range.  Values outside the
//! range saturate; they never wrap.

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    scale: f32,
    max_output: u8,
}

impl Quantizer {
    pub fn new(max_expected_absorbance: f32, max_output: u8) -> Self {
        Self {
            scale: f32::from(max_output) / max_expected_absorbance,
            max_output,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.max_expected_absorbance, config.max_output_value)
    }

    pub fn max_output(&self) -> u8 {
        self.max_output
    }

    /// Scale, round to nearest, clamp to `[0, max_output]`.
    pub fn quantize(&self, absorbance: f32) -> u8 {
        if absorbance.is_nan() {
            return 0;
        }
        let scaled = (absorbance * self.scale).round();
        scaled.clamp(0.0, f32::from(self.max_output)) as u8
    }

    /// Inverse of [`quantize`](Self::quantize), up to rounding.
    pub fn to_absorbance(&self, output: u8) -> f32 {
        f32::from(output) / self.scale
    }
}
