//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the sensor bank before calibration; calibrating it
//! yields a [`RunningService`], which owns everything mutated in steady
//! state (accumulator, sensor histories, tick phase).  Ticking an
//! uncalibrated service is therefore impossible by construction.  All
//! I/O flows through port traits injected at call sites, making the
//! whole pipeline testable with mock adapters.
//!
//! ```text
//!  RawSourcePort ────▶ ┌──────────────────────────────┐ ──▶ Transport
//!                      │        RunningService         │
//! IlluminationPort ◀── │ Accumulator · Calibration ·   │ ──▶ EventSink
//!   (startup only)     │ SensorBank · TickScheduler    │
//!                      └──────────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace, warn};
use rand::RngCore;
use rand::rngs::SmallRng;

use crate::config::SystemConfig;
use crate::error::Result;
use crate::link::codec::Frame;
use crate::link::transport::{Transport, send_frame};
use crate::scheduler::TickScheduler;
use crate::sensors::SensorBank;
use crate::sensors::accumulator::SampleAccumulator;
use crate::sensors::calibration::Calibration;
use crate::sensors::noise::NoiseGenerator;

use super::events::{AppEvent, CalibrationReport, FrameReport};
use super::ports::{EventSink, IlluminationPort, RawSourcePort};

// ───────────────────────────────────────────────────────────────
// AppService (uncalibrated)
// ───────────────────────────────────────────────────────────────

/// A configured but not yet calibrated service.
pub struct AppService<R = SmallRng> {
    config: SystemConfig,
    bank: SensorBank<R>,
}

impl AppService<SmallRng> {
    /// Validate `config` and build the sensor bank with a noise stream
    /// seeded from `seed`.
    pub fn new(config: SystemConfig, seed: u64) -> Result<Self> {
        Self::with_noise(config, NoiseGenerator::from_seed(seed))
    }
}

impl<R: RngCore> AppService<R> {
    /// Like [`new`](AppService::new), with an explicit noise generator.
    pub fn with_noise(config: SystemConfig, noise: NoiseGenerator<R>) -> Result<Self> {
        config.validate()?;
        let bank = SensorBank::new(&config, noise);
        Ok(Self { config, bank })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Run the startup calibration protocol and enter steady state.
    ///
    /// 1. Illumination off, settle, average `calibration_samples` reads
    ///    into the dark level.
    /// 2. Illumination on, settle, average as many reads into the full
    ///    level.
    ///
    /// The illumination stays on afterwards.  A low-contrast result is
    /// reported but never fatal.
    pub fn calibrate(
        self,
        hw: &mut (impl RawSourcePort + IlluminationPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> RunningService<R> {
        let samples = self.config.calibration_samples;
        info!("Calibration: {} reads per reference level", samples);
        sink.emit(&AppEvent::CalibrationStarted { samples });

        let dark_level = self.reference_level(hw, delay, false);
        let full_level = self.reference_level(hw, delay, true);

        let calibration = Calibration::new(dark_level, full_level, self.config.calibration);
        let report = CalibrationReport {
            dark_level,
            full_level,
            low_contrast: calibration.is_low_contrast(),
        };
        if report.low_contrast {
            warn!(
                "Calibration contrast low: dark={:.1} full={:.1}, check the light path",
                dark_level, full_level
            );
        } else {
            info!("Calibration done: dark={:.1} full={:.1}", dark_level, full_level);
        }
        sink.emit(&AppEvent::Calibrated(report));

        let running = RunningService {
            scheduler: TickScheduler::new(self.config.sample_interval_ms),
            accumulator: SampleAccumulator::new(),
            calibration,
            bank: self.bank,
            config: self.config,
            ticks: 0,
            frames_sent: 0,
            frames_dropped: 0,
        };
        sink.emit(&AppEvent::Started {
            sensors: running.bank.len(),
            interval_ms: running.config.sample_interval_ms,
        });
        running
    }

    fn reference_level(
        &self,
        hw: &mut (impl RawSourcePort + IlluminationPort),
        delay: &mut impl DelayNs,
        illuminated: bool,
    ) -> f32 {
        hw.set_illumination(illuminated);
        delay.delay_ms(self.config.illumination_settle_ms);

        let mut acc = SampleAccumulator::new();
        for _ in 0..self.config.calibration_samples {
            acc.add(hw.read_raw());
        }
        // calibration_samples > 0 is enforced by validate().
        acc.drain().unwrap_or_default()
    }
}

// ───────────────────────────────────────────────────────────────
// RunningService (calibrated, steady state)
// ───────────────────────────────────────────────────────────────

/// A calibrated service producing one frame per sampling interval.
pub struct RunningService<R = SmallRng> {
    config: SystemConfig,
    calibration: Calibration,
    bank: SensorBank<R>,
    accumulator: SampleAccumulator,
    scheduler: TickScheduler,
    ticks: u64,
    frames_sent: u64,
    frames_dropped: u64,
}

impl<R: RngCore> RunningService<R> {
    // ── Per-poll orchestration ────────────────────────────────

    /// One pass of the polling loop: take a raw read, and if a tick
    /// boundary has been reached, produce and transmit a frame.
    pub fn poll(
        &mut self,
        hw: &mut impl RawSourcePort,
        now_ms: u64,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> Option<Frame> {
        self.sample(hw);
        if self.scheduler.due(now_ms) {
            self.tick(transport, sink)
        } else {
            None
        }
    }

    /// Add one raw read to the current interval.
    pub fn sample(&mut self, hw: &mut impl RawSourcePort) {
        let raw = hw.read_raw();
        trace!("raw={:.1}", raw);
        self.accumulator.add(raw);
    }

    /// Close the current interval: average, calibrate, fan out to the
    /// sensor bank, transmit.
    ///
    /// An interval with no reads is skipped rather than averaged.
    pub fn tick(
        &mut self,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> Option<Frame> {
        self.ticks += 1;
        let tick = self.ticks;

        let reads = self.accumulator.len();
        let Some(raw_average) = self.accumulator.drain() else {
            warn!("Tick {}: no raw reads this interval, skipped", tick);
            sink.emit(&AppEvent::TickSkipped { tick });
            return None;
        };

        let absorbance = self.calibration.calibrate(raw_average);
        let sensors = self.bank.update_all(absorbance);
        let calibrated = self
            .config
            .emit_calibrated
            .then(|| self.bank.quantizer().quantize(absorbance));
        let frame = Frame::new(calibrated, sensors);

        debug!(
            "Tick {}: raw={:.1} ({} reads) A={:.3} frame={:?}",
            tick, raw_average, reads, absorbance, frame
        );

        match send_frame(transport, &frame) {
            Ok(_) => self.frames_sent += 1,
            Err(e) => {
                warn!("Tick {}: frame not sent ({})", tick, e);
                self.frames_dropped += 1;
                sink.emit(&AppEvent::FrameDropped { tick });
            }
        }

        sink.emit(&AppEvent::Frame(FrameReport {
            tick,
            raw_average,
            reads,
            absorbance,
            frame: frame.clone(),
        }));
        Some(frame)
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn bank(&self) -> &SensorBank<R> {
        &self.bank
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Tick boundaries processed (skipped ones included).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }
}
