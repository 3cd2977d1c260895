//! Photodiode calibration: raw intensity to absorbance.
//!
//! Two reference levels are captured once at boot (see
//! [`AppService::calibrate`](crate::app::service::AppService::calibrate)):
//! the dark level with the illumination LED off, and the full level with
//! the LED on and an empty light path.  Absorbance is the log ratio of
//! the full level to the live reading, linearised by the power-law
//! correction fitted offline (`output = c · A^g`).
//!
//! Only `full_level` enters the formula.  `dark_level` is kept for
//! diagnostics (contrast check, logging).

use crate::config::CalibrationConstants;

/// Smallest raw average the model will divide by.
///
/// A raw average in `[0, MIN_RAW_READING)` (total darkness) is raised to
/// this sub-LSB value, so the log ratio stays finite and large instead of
/// becoming infinite.  Negative averages are left alone: their ratio is
/// negative and maps to zero absorbance.
pub const MIN_RAW_READING: f32 = 0.5;

/// Minimum `full_level - dark_level` (ADC counts) for a trustworthy
/// calibration.  Below this the service still runs but reports a warning.
pub const MIN_CALIBRATION_CONTRAST: f32 = 20.0;

/// Reference levels plus correction constants.  Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    dark_level: f32,
    full_level: f32,
    constants: CalibrationConstants,
}

impl Calibration {
    pub fn new(dark_level: f32, full_level: f32, constants: CalibrationConstants) -> Self {
        Self {
            dark_level,
            full_level,
            constants,
        }
    }

    pub fn dark_level(&self) -> f32 {
        self.dark_level
    }

    pub fn full_level(&self) -> f32 {
        self.full_level
    }

    pub fn constants(&self) -> CalibrationConstants {
        self.constants
    }

    /// Difference between the two reference levels.
    pub fn contrast(&self) -> f32 {
        self.full_level - self.dark_level
    }

    /// `true` when the references are too close to resolve absorbance.
    pub fn is_low_contrast(&self) -> bool {
        !(self.contrast() >= MIN_CALIBRATION_CONTRAST)
    }

    /// Convert an averaged raw reading into calibrated absorbance.
    ///
    /// Always finite and `>= 0`.
    pub fn calibrate(&self, raw_average: f32) -> f32 {
        let raw = if raw_average.is_nan() {
            self.full_level
        } else if raw_average >= 0.0 {
            raw_average.max(MIN_RAW_READING)
        } else {
            raw_average
        };
        let ratio = self.full_level / raw;

        let linear = if ratio.is_finite() && ratio > 0.0 {
            (ratio.log10() / self.constants.scale_corrector).max(0.0)
        } else {
            0.0
        };

        let absorbance = linear.powf(self.constants.gamma_corrector);
        if absorbance.is_finite() { absorbance } else { 0.0 }
    }
}
