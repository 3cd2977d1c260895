//! Port traits: the hexagonal boundary between the pipeline and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (photodiode ADC, illumination LED, entropy source,
//! event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the pipeline never touches hardware directly.

use embedded_hal::digital::OutputPin;

// ───────────────────────────────────────────────────────────────
// Raw source port (driven adapter: photodiode → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one raw light-intensity reading per call.
///
/// Readings approximate 10-bit ADC counts (`0.0..=1023.0`).
pub trait RawSourcePort {
    fn read_raw(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Illumination port (driven adapter: domain → LED driver)
// ───────────────────────────────────────────────────────────────

/// Write-side port: switches the light source used for calibration.
pub trait IlluminationPort {
    fn set_illumination(&mut self, on: bool);
}

/// Drives the illumination LED from any `embedded-hal` output pin.
pub struct PinIllumination<P> {
    pin: P,
}

impl<P: OutputPin> PinIllumination<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> IlluminationPort for PinIllumination<P> {
    fn set_illumination(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            log::warn!("illumination pin write failed: {:?}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Entropy port (driven adapter: environment → noise seed)
// ───────────────────────────────────────────────────────────────

/// Supplies the one-off seed for the noise stream at boot.
pub trait EntropyPort {
    fn seed(&mut self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
