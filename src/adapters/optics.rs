//! Simulated optical bench for host runs.
//!
//! Stands in for the photodiode, the illumination LED and the entropy
//! pin all at once.  A sample slide drifts in and out of the beam, so the
//! true absorbance follows a slow raised-cosine profile, and the reading
//! obeys Beer–Lambert on top of the dark offset:
//!
//! ```text
//!   raw = dark + (full - dark) · 10^(-A(t)) + read noise
//! ```
//!
//! With the LED off the reading is just the dark offset plus noise.

use core::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::{EntropyPort, IlluminationPort, RawSourcePort};
use crate::pins::ADC_PIPELINE_MAX;

/// Dark offset of the simulated detector (counts).
pub const DEFAULT_DARK_LEVEL: f32 = 40.0;
/// Unobstructed illuminated reading (counts).
pub const DEFAULT_FULL_LEVEL: f32 = 900.0;
/// Peak-to-peak half-width of the ADC read noise (counts).
pub const DEFAULT_READ_NOISE: f32 = 2.0;

/// Raised-cosine absorbance profile: 0 at `t = 0`, `peak` at half period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsorbanceProfile {
    pub peak: f32,
    pub period_ms: u64,
}

impl Default for AbsorbanceProfile {
    fn default() -> Self {
        Self {
            peak: 1.5,
            period_ms: 20_000,
        }
    }
}

impl AbsorbanceProfile {
    /// A sample that never moves.
    pub fn constant(absorbance: f32) -> Self {
        Self {
            peak: absorbance,
            period_ms: 0,
        }
    }

    pub fn at(&self, t_ms: u64) -> f32 {
        if self.period_ms == 0 {
            return self.peak;
        }
        let phase = (t_ms % self.period_ms) as f32 / self.period_ms as f32;
        self.peak * 0.5 * (1.0 - (TAU * phase).cos())
    }
}

pub struct SimulatedOptics {
    dark_level: f32,
    full_level: f32,
    read_noise: f32,
    profile: AbsorbanceProfile,
    now_ms: u64,
    lit: bool,
    seed: u64,
    rng: SmallRng,
}

impl SimulatedOptics {
    pub fn new(seed: u64) -> Self {
        Self {
            dark_level: DEFAULT_DARK_LEVEL,
            full_level: DEFAULT_FULL_LEVEL,
            read_noise: DEFAULT_READ_NOISE,
            profile: AbsorbanceProfile::default(),
            now_ms: 0,
            lit: false,
            seed,
            // Independent of the noise stream the service is seeded with.
            rng: SmallRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    pub fn with_levels(mut self, dark_level: f32, full_level: f32) -> Self {
        self.dark_level = dark_level;
        self.full_level = full_level;
        self
    }

    pub fn with_read_noise(mut self, read_noise: f32) -> Self {
        self.read_noise = read_noise.max(0.0);
        self
    }

    pub fn with_profile(mut self, profile: AbsorbanceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Move the sample to where it is at `now_ms`.
    pub fn set_time(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Absorbance of the sample in the beam right now.
    pub fn true_absorbance(&self) -> f32 {
        self.profile.at(self.now_ms)
    }

    /// Noise-free reading for the current state.
    pub fn ideal_reading(&self) -> f32 {
        if self.lit {
            let transmitted = 10f32.powf(-self.true_absorbance());
            self.dark_level + (self.full_level - self.dark_level) * transmitted
        } else {
            self.dark_level
        }
    }
}

impl RawSourcePort for SimulatedOptics {
    fn read_raw(&mut self) -> f32 {
        let noise = if self.read_noise > 0.0 {
            self.rng.gen_range(-self.read_noise..=self.read_noise)
        } else {
            0.0
        };
        (self.ideal_reading() + noise).clamp(0.0, ADC_PIPELINE_MAX)
    }
}

impl IlluminationPort for SimulatedOptics {
    fn set_illumination(&mut self, on: bool) {
        self.lit = on;
    }
}

impl EntropyPort for SimulatedOptics {
    fn seed(&mut self) -> u64 {
        self.seed
    }
}
