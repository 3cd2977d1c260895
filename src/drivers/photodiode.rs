//! Photodiode ADC driver.
//!
//! Reads the transimpedance amplifier output on ADC1 and rescales the
//! ESP32-S3's 12-bit counts onto the 10-bit range the pipeline's
//! calibration was tuned for.  Also reads the unconnected seed input
//! used to seed the noise stream.

use crate::drivers::hw_init;
use crate::pins;

/// Convert native 12-bit counts to the pipeline's 10-bit scale.
pub fn to_pipeline_counts(native: u16) -> f32 {
    f32::from(native) * (pins::ADC_PIPELINE_MAX / pins::ADC_NATIVE_MAX)
}

pub struct Photodiode;

impl Photodiode {
    pub fn new() -> Self {
        Self
    }

    /// One light-intensity reading in pipeline counts.
    pub fn read(&mut self) -> f32 {
        to_pipeline_counts(hw_init::adc1_read(pins::PHOTODIODE_ADC_CHANNEL))
    }

    /// Fold several reads of the floating seed input into a 64-bit seed.
    ///
    /// The low bits of a floating ADC input wander with thermal noise; a
    /// handful of them is enough to decorrelate boots.
    pub fn entropy_seed(&mut self) -> u64 {
        let mut seed: u64 = 0xcbf2_9ce4_8422_2325;
        for _ in 0..32 {
            let sample = hw_init::adc1_read(pins::SEED_ADC_CHANNEL);
            seed ^= u64::from(sample);
            seed = seed.wrapping_mul(0x0100_0000_01b3);
        }
        seed
    }
}

impl Default for Photodiode {
    fn default() -> Self {
        Self::new()
    }
}
