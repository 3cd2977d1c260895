//! Sensor subsystem: calibration, virtual sensors and the aggregating
//! [`SensorBank`].
//!
//! ```text
//!  raw reads ─▶ SampleAccumulator ─▶ Calibration ─▶ SensorBank ─▶ outputs
//!                                                   ├ VirtualSensor 1
//!                                                   ├ VirtualSensor 2
//!                                                   └ …
//! ```
//!
//! The bank owns every virtual sensor and the single noise stream they
//! share, and produces one quantized output per sensor each tick.

pub mod accumulator;
pub mod calibration;
pub mod noise;
pub mod quantizer;
pub mod virtual_sensor;

use heapless::Vec;
use rand::RngCore;
use rand::rngs::SmallRng;

use crate::config::{MAX_SENSORS, SystemConfig};
use noise::NoiseGenerator;
use quantizer::Quantizer;
use virtual_sensor::VirtualSensor;

/// Outputs of one tick, in table order.
pub type BankOutputs = Vec<u8, MAX_SENSORS>;

/// Ordered collection of independently configured virtual sensors.
pub struct SensorBank<R = SmallRng> {
    sensors: Vec<VirtualSensor, MAX_SENSORS>,
    noise: NoiseGenerator<R>,
    quantizer: Quantizer,
}

impl<R: RngCore> SensorBank<R> {
    /// Build one sensor per table entry, in table order.
    pub fn new(config: &SystemConfig, noise: NoiseGenerator<R>) -> Self {
        let quantizer = Quantizer::from_config(config);
        let mut sensors = Vec::new();
        for entry in &config.sensors {
            // Both tables share MAX_SENSORS capacity.
            let _ = sensors.push(VirtualSensor::new(
                entry,
                config.sample_interval_ms,
                quantizer,
            ));
        }
        Self {
            sensors,
            noise,
            quantizer,
        }
    }

    /// Update every sensor exactly once with the same absorbance.
    pub fn update_all(&mut self, absorbance: f32) -> BankOutputs {
        let mut outputs = Vec::new();
        for sensor in &mut self.sensors {
            let _ = outputs.push(sensor.update(absorbance, &mut self.noise));
        }
        outputs
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn sensors(&self) -> &[VirtualSensor] {
        &self.sensors
    }

    /// The scaling shared by every sensor (and the calibrated byte).
    pub fn quantizer(&self) -> Quantizer {
        self.quantizer
    }
}
