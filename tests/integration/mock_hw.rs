//! Mock hardware adapters for integration tests.
//!
//! Records every illumination change, settle delay and pin write so
//! tests can assert on the full history without touching real GPIO or
//! ADC registers.

use core::convert::Infallible;

use absorbsim::app::events::AppEvent;
use absorbsim::app::ports::{EventSink, IlluminationPort, RawSourcePort};
use absorbsim::config::{CalibrationConstants, SensorConfig, SystemConfig};
use absorbsim::link::transport::Transport;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

// ── MockOptics ────────────────────────────────────────────────

/// Photodiode + LED pair with exact, noise-free readings.
///
/// Dark reads return `dark`; illuminated reads return
/// `full · transmittance`.
pub struct MockOptics {
    pub dark: f32,
    pub full: f32,
    pub transmittance: f32,
    pub lit: bool,
    pub reads: u32,
    pub illumination: Vec<bool>,
}

#[allow(dead_code)]
impl MockOptics {
    pub fn new(dark: f32, full: f32) -> Self {
        Self {
            dark,
            full,
            transmittance: 1.0,
            lit: false,
            reads: 0,
            illumination: Vec::new(),
        }
    }

    /// Attenuate the beam by `10^-absorbance`.
    pub fn set_absorbance(&mut self, absorbance: f32) {
        self.transmittance = 10f32.powf(-absorbance);
    }
}

impl RawSourcePort for MockOptics {
    fn read_raw(&mut self) -> f32 {
        self.reads += 1;
        if self.lit {
            self.full * self.transmittance
        } else {
            self.dark
        }
    }
}

impl IlluminationPort for MockOptics {
    fn set_illumination(&mut self, on: bool) {
        self.illumination.push(on);
        self.lit = on;
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Returns immediately; remembers how long it was asked to wait.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub calls: u32,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }
}

// ── MockPin ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPin {
    pub writes: Vec<bool>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.push(true);
        Ok(())
    }
}

// ── Event capture ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn frames(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Frame(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Transports ────────────────────────────────────────────────

/// Refuses every write.
pub struct BrokenLink;

impl Transport for BrokenLink {
    type Error = &'static str;

    fn write(&mut self, _data: &[u8]) -> Result<usize, &'static str> {
        Err("cable unplugged")
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}

// ── Config helpers ────────────────────────────────────────────

/// Unity corrections and a full scale of 2.55, so one absorbance unit
/// quantizes to exactly 100 counts.
#[allow(dead_code)]
pub fn unity_config(sensors: &[SensorConfig]) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.calibration = CalibrationConstants {
        gamma_corrector: 1.0,
        scale_corrector: 1.0,
    };
    config.max_expected_absorbance = 2.55;
    config.calibration_samples = 16;
    config.sensors.clear();
    for sensor in sensors {
        config.push_sensor(sensor.clone()).unwrap();
    }
    config
}

/// A noiseless sensor with the given response time.
#[allow(dead_code)]
pub fn quiet_sensor(label: &str, response_time_ms: u32) -> SensorConfig {
    SensorConfig::new(label, response_time_ms, 0.0, 1.0, 1.0, 0.0)
}
