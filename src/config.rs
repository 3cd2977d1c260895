//! System configuration parameters
//!
//! Everything the simulator needs is fixed before steady-state ticking
//! starts: the sampling interval, the calibration constants, the output
//! scaling and the virtual sensor table.  The host simulator may load a
//! JSON override at startup; nothing is reconfigured afterwards.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on any sensor's history depth (ring capacity).
pub const MAX_HISTORY_CAPACITY: usize = 50;

/// Upper bound on the number of virtual sensors in one bank.
pub const MAX_SENSORS: usize = 8;

/// Longest encoded frame: optional calibrated byte, sensor bytes,
/// count byte, newline.
pub const MAX_FRAME_LEN: usize = MAX_SENSORS + 3;

/// Maximum label length for a virtual sensor.
pub const LABEL_LEN: usize = 16;

/// Power-law correction constants from the offline fit `output = c · A^g`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConstants {
    /// Exponent applied to the log ratio (`1/g`).
    pub gamma_corrector: f32,
    /// Divisor applied to the log ratio.
    pub scale_corrector: f32,
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self {
            gamma_corrector: 1.0 / 0.94,
            scale_corrector: 1.06,
        }
    }
}

/// Parameters of one virtual sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Human-readable label (e.g., "slow").
    pub label: String<LABEL_LEN>,
    /// Simulated response time (milliseconds).
    pub response_time_ms: u32,
    /// Minimum reported absorbance before noise.
    pub background_floor: f32,
    /// Linear gain on the calibrated absorbance.
    pub sensitivity: f32,
    /// Exponent applied to the calibrated absorbance.
    pub nonlinearity_exponent: f32,
    /// Peak noise amplitude (absorbance units).
    pub noise_amplitude: f32,
}

impl SensorConfig {
    pub fn new(
        label: &str,
        response_time_ms: u32,
        background_floor: f32,
        sensitivity: f32,
        nonlinearity_exponent: f32,
        noise_amplitude: f32,
    ) -> Self {
        Self {
            label: truncated_label(label),
            response_time_ms,
            background_floor,
            sensitivity,
            nonlinearity_exponent,
            noise_amplitude,
        }
    }

    /// Number of past outputs blended into each update.
    ///
    /// `response_time_ms / sample_interval_ms`, rounded to nearest and
    /// capped at [`MAX_HISTORY_CAPACITY`].
    pub fn history_depth(&self, sample_interval_ms: u32) -> usize {
        if sample_interval_ms == 0 {
            return 0;
        }
        let depth = self.response_time_ms.saturating_add(sample_interval_ms / 2) / sample_interval_ms;
        (depth as usize).min(MAX_HISTORY_CAPACITY)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.background_floor.is_finite() && self.background_floor >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "background_floor must be finite and >= 0",
            ));
        }
        if !self.sensitivity.is_finite() {
            return Err(ConfigError::ValidationFailed("sensitivity must be finite"));
        }
        if !(self.nonlinearity_exponent.is_finite() && self.nonlinearity_exponent > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "nonlinearity_exponent must be finite and > 0",
            ));
        }
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "noise_amplitude must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

fn truncated_label(label: &str) -> String<LABEL_LEN> {
    let mut out = String::new();
    for c in label.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Sampling interval: one frame per interval (milliseconds).
    pub sample_interval_ms: u32,

    // --- Calibration ---
    /// Raw reads averaged per reference level at startup.
    pub calibration_samples: u16,
    /// Wait after each illumination change before sampling (milliseconds).
    pub illumination_settle_ms: u32,
    /// Power-law correction constants.
    pub calibration: CalibrationConstants,

    // --- Output ---
    /// Absorbance mapped to `max_output_value`.
    pub max_expected_absorbance: f32,
    /// Top of the quantized output range.
    pub max_output_value: u8,
    /// Prefix each frame with the calibrated absorbance byte.
    pub emit_calibrated: bool,
    /// Serial link speed (baud).
    pub baud_rate: u32,

    // --- Virtual sensors ---
    pub sensors: Vec<SensorConfig, MAX_SENSORS>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut sensors = Vec::new();
        for sensor in [
            SensorConfig::new("instant", 0, 0.0, 1.0, 1.0, 0.01),
            SensorConfig::new("slow", 500, 0.05, 0.9, 1.0, 0.02),
            SensorConfig::new("nonlinear", 150, 0.0, 1.2, 0.7, 0.05),
            SensorConfig::new("sluggish", 2000, 0.1, 0.8, 1.3, 0.03),
        ] {
            // Four entries always fit MAX_SENSORS.
            let _ = sensors.push(sensor);
        }

        Self {
            // Timing
            sample_interval_ms: 25, // 40 Hz

            // Calibration
            calibration_samples: 256,
            illumination_settle_ms: 100,
            calibration: CalibrationConstants::default(),

            // Output
            max_expected_absorbance: 2.5,
            max_output_value: 255,
            emit_calibrated: true,
            baud_rate: 9600,

            sensors,
        }
    }
}

impl SystemConfig {
    /// Append a sensor to the table.
    pub fn push_sensor(&mut self, sensor: SensorConfig) -> Result<(), ConfigError> {
        self.sensors
            .push(sensor)
            .map_err(|_| ConfigError::TooManySensors)
    }

    /// Number of value bytes per frame (calibrated byte included).
    pub fn frame_value_count(&self) -> usize {
        self.sensors.len() + usize::from(self.emit_calibrated)
    }

    /// Quantization factor: output counts per absorbance unit.
    pub fn output_scale(&self) -> f32 {
        f32::from(self.max_output_value) / self.max_expected_absorbance
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_interval_ms must be > 0"));
        }
        if self.calibration_samples == 0 {
            return Err(ConfigError::ValidationFailed("calibration_samples must be > 0"));
        }
        let CalibrationConstants {
            gamma_corrector,
            scale_corrector,
        } = self.calibration;
        if !(gamma_corrector.is_finite() && gamma_corrector > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "gamma_corrector must be finite and > 0",
            ));
        }
        if !(scale_corrector.is_finite() && scale_corrector > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "scale_corrector must be finite and > 0",
            ));
        }
        if !(self.max_expected_absorbance.is_finite() && self.max_expected_absorbance > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "max_expected_absorbance must be finite and > 0",
            ));
        }
        if self.max_output_value == 0 {
            return Err(ConfigError::ValidationFailed("max_output_value must be > 0"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be > 0"));
        }
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        self.sensors.iter().try_for_each(SensorConfig::validate)
    }
}
