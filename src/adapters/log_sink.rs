//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (ESP-IDF console on target, stderr on the host).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] on one tagged line.
///
/// Per-frame lines go out at `debug` so a 40 Hz stream does not drown
/// the console at the default level.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CalibrationStarted { samples } => {
                info!("CALIB | started, {} reads per level", samples);
            }
            AppEvent::Calibrated(r) => {
                if r.low_contrast {
                    warn!(
                        "CALIB | dark={:.1} full={:.1} | LOW CONTRAST",
                        r.dark_level, r.full_level
                    );
                } else {
                    info!("CALIB | dark={:.1} full={:.1}", r.dark_level, r.full_level);
                }
            }
            AppEvent::Started {
                sensors,
                interval_ms,
            } => {
                info!("START | sensors={} interval={}ms", sensors, interval_ms);
            }
            AppEvent::Frame(f) => {
                debug!(
                    "FRAME | tick={} | raw={:.1} n={} | A={:.3} | cal={:?} | out={:?}",
                    f.tick,
                    f.raw_average,
                    f.reads,
                    f.absorbance,
                    f.frame.calibrated(),
                    f.frame.sensors(),
                );
            }
            AppEvent::TickSkipped { tick } => {
                warn!("SKIP | tick={} | no raw reads", tick);
            }
            AppEvent::FrameDropped { tick } => {
                warn!("FRAME | tick={} | dropped by transport", tick);
            }
        }
    }
}
