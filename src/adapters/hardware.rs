//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the photodiode and the illumination LED, exposing them through
//! [`RawSourcePort`], [`IlluminationPort`] and [`EntropyPort`].  The
//! frame UART is exposed separately as a [`Transport`].  On non-espidf
//! targets the underlying drivers use cfg-gated stubs.

use crate::app::ports::{EntropyPort, IlluminationPort, PinIllumination, RawSourcePort};
use crate::drivers::hw_init;
use crate::drivers::illumination_led::IlluminationLed;
use crate::drivers::photodiode::Photodiode;
use crate::link::transport::Transport;

/// FreeRTOS ticks to wait for the TX FIFO on flush.
const UART_FLUSH_TICKS: u32 = 10;

/// Concrete adapter that combines the optical hardware behind port traits.
pub struct HardwareAdapter {
    photodiode: Photodiode,
    illumination: PinIllumination<IlluminationLed>,
}

impl HardwareAdapter {
    pub fn new(photodiode: Photodiode, led: IlluminationLed) -> Self {
        Self {
            photodiode,
            illumination: PinIllumination::new(led),
        }
    }
}

// ── RawSourcePort implementation ──────────────────────────────

impl RawSourcePort for HardwareAdapter {
    fn read_raw(&mut self) -> f32 {
        self.photodiode.read()
    }
}

// ── IlluminationPort implementation ───────────────────────────

impl IlluminationPort for HardwareAdapter {
    fn set_illumination(&mut self, on: bool) {
        self.illumination.set_illumination(on);
    }
}

// ── EntropyPort implementation ────────────────────────────────

impl EntropyPort for HardwareAdapter {
    fn seed(&mut self) -> u64 {
        self.photodiode.entropy_seed()
    }
}

// ── UART transport ────────────────────────────────────────────

/// Frame link over the board UART.
#[derive(Debug, Default)]
pub struct UartTransport;

impl UartTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UartTransport {
    /// Negative ESP-IDF return code.
    type Error = i32;

    fn write(&mut self, data: &[u8]) -> Result<usize, i32> {
        hw_init::uart_write(data)
    }

    fn flush(&mut self) -> Result<(), i32> {
        hw_init::uart_flush(UART_FLUSH_TICKS)
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::link::codec::Frame;
    use crate::link::transport::send_frame;

    #[test]
    fn host_stubs_are_inert() {
        let mut hw = HardwareAdapter::new(Photodiode::new(), IlluminationLed::new());
        assert_eq!(hw.read_raw(), 0.0);
        hw.set_illumination(true);
        assert!(hw.illumination.pin().is_on());
    }

    #[test]
    fn uart_stub_accepts_frames() {
        let frame = Frame::new(Some(1), heapless::Vec::from_slice(&[2, 3]).unwrap());
        assert_eq!(send_frame(&mut UartTransport::new(), &frame), Ok(5));
    }
}
