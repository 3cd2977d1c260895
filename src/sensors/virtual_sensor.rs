//! A simulated sensor derived from the calibrated absorbance.
//!
//! Each sensor applies its own gain and exponent, lags behind the input
//! by blending in its recent outputs, never reports below its background
//! floor, and carries a positive-only noise term.
//!
//! ## Response-time model
//!
//! The history holds the sensor's last `history_depth` outputs (oldest
//! first).  Each update averages the new instantaneous response with
//! those outputs as `depth + 1` equally weighted terms.  Until the
//! history fills, the missing terms count as zero, so a fresh sensor
//! ramps up from zero like a physical sensor settling after power-on.

use heapless::{Deque, String};

use crate::config::{LABEL_LEN, MAX_HISTORY_CAPACITY, SensorConfig};

use super::noise::NoiseGenerator;
use super::quantizer::Quantizer;

pub struct VirtualSensor {
    label: String<LABEL_LEN>,
    history_depth: usize,
    background_floor: f32,
    sensitivity: f32,
    nonlinearity_exponent: f32,
    noise_amplitude: f32,
    quantizer: Quantizer,
    history: Deque<u8, MAX_HISTORY_CAPACITY>,
}

impl VirtualSensor {
    /// Build a sensor from its table entry.
    ///
    /// `history_depth` is derived from the response time and capped at
    /// [`MAX_HISTORY_CAPACITY`], so it can never exceed the ring.
    pub fn new(config: &SensorConfig, sample_interval_ms: u32, quantizer: Quantizer) -> Self {
        let history_depth = config.history_depth(sample_interval_ms);
        debug_assert!(history_depth <= MAX_HISTORY_CAPACITY);

        Self {
            label: config.label.clone(),
            history_depth,
            background_floor: config.background_floor,
            sensitivity: config.sensitivity,
            nonlinearity_exponent: config.nonlinearity_exponent,
            noise_amplitude: config.noise_amplitude,
            quantizer,
            history: Deque::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn history_depth(&self) -> usize {
        self.history_depth
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Past outputs, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u8> + '_ {
        self.history.iter().copied()
    }

    /// Instantaneous (unsmoothed, noise-free) response to `absorbance`.
    pub fn response(&self, absorbance: f32) -> f32 {
        let a = if absorbance.is_nan() {
            0.0
        } else {
            absorbance.max(0.0)
        };
        self.sensitivity * a.powf(self.nonlinearity_exponent)
    }

    /// Advance one tick and return the quantized output.
    pub fn update<R: rand::RngCore>(
        &mut self,
        absorbance: f32,
        noise: &mut NoiseGenerator<R>,
    ) -> u8 {
        let raw_response = self.response(absorbance);

        let smoothed = if self.history_depth == 0 {
            raw_response
        } else {
            let past: f32 = self
                .history
                .iter()
                .map(|&q| self.quantizer.to_absorbance(q))
                .sum();
            (past + raw_response) / (self.history_depth + 1) as f32
        };

        let floored = smoothed.max(self.background_floor);
        let noisy = floored + noise.sample(self.noise_amplitude).abs();
        let output = self.quantizer.quantize(noisy);

        if self.history_depth > 0 {
            if self.history.len() >= self.history_depth {
                self.history.pop_front();
            }
            // len < history_depth <= capacity, so this cannot fail.
            let _ = self.history.push_back(output);
        }

        output
    }
}

impl core::fmt::Debug for VirtualSensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualSensor")
            .field("label", &self.label)
            .field("history_depth", &self.history_depth)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}
