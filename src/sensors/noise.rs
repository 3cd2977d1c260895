//! Bounded uniform noise for the virtual sensors.
//!
//! One generator feeds every sensor in a bank, so all noise comes from a
//! single stream seeded once at boot.  On hardware the seed is read from
//! a floating ADC input; tests pass a fixed seed to get reproducible
//! outputs.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform noise source over `[-amplitude, +amplitude]`.
pub struct NoiseGenerator<R = SmallRng> {
    rng: R,
}

impl NoiseGenerator<SmallRng> {
    /// Deterministic generator for the given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> NoiseGenerator<R> {
    /// Wrap any RNG (e.g. a scripted one in tests).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one value in `[-amplitude, +amplitude]`.
    ///
    /// A zero, negative or non-finite amplitude yields `0.0` without
    /// advancing the stream.
    pub fn sample(&mut self, amplitude: f32) -> f32 {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..=amplitude)
    }
}

impl<R> core::fmt::Debug for NoiseGenerator<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NoiseGenerator").finish_non_exhaustive()
    }
}
