//! Illumination LED driver.
//!
//! A single digital output switches the light source that shines through
//! the sample onto the photodiode.  Exposed as an `embedded-hal`
//! [`OutputPin`] so the application wraps it in
//! [`PinIllumination`](crate::app::ports::PinIllumination) like any
//! other pin.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

use crate::drivers::hw_init;
use crate::pins;

pub struct IlluminationLed {
    on: bool,
}

impl Default for IlluminationLed {
    fn default() -> Self {
        Self::new()
    }
}

impl IlluminationLed {
    /// The LED starts off; `init_peripherals` drives the pin low.
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn write(&mut self, on: bool) {
        hw_init::gpio_write(pins::ILLUMINATION_LED_GPIO, on);
        self.on = on;
    }
}

impl ErrorType for IlluminationLed {
    type Error = Infallible;
}

impl OutputPin for IlluminationLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.write(true);
        Ok(())
    }
}

impl StatefulOutputPin for IlluminationLed {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.on)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_pin_state() {
        let mut led = IlluminationLed::new();
        assert!(!led.is_on());
        led.set_high().unwrap();
        assert!(led.is_on());
        assert!(led.is_set_high().unwrap());
        led.toggle().unwrap();
        assert!(!led.is_on());
    }
}
