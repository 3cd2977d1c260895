//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log to the console, count them in
//! tests, ...).

use crate::link::codec::Frame;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup calibration began (`samples` reads per reference level).
    CalibrationStarted { samples: u16 },

    /// Startup calibration finished.
    Calibrated(CalibrationReport),

    /// The service entered steady-state ticking.
    Started { sensors: usize, interval_ms: u32 },

    /// One frame was produced (and handed to the transport).
    Frame(FrameReport),

    /// A tick boundary passed with no raw reads to average.
    TickSkipped { tick: u64 },

    /// The transport rejected a frame.
    FrameDropped { tick: u64 },
}

/// Outcome of the startup calibration protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    pub dark_level: f32,
    pub full_level: f32,
    /// `true` when the two references are too close to trust.
    pub low_contrast: bool,
}

/// Per-tick summary suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    /// Averaged raw reading for this interval.
    pub raw_average: f32,
    /// Raw reads that went into the average.
    pub reads: u32,
    /// Calibrated absorbance.
    pub absorbance: f32,
    pub frame: Frame,
}
