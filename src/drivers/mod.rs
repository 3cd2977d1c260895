//! Peripheral drivers.  Each is dual-target: real registers on ESP-IDF,
//! in-memory state on host.

pub mod hw_init;
pub mod illumination_led;
pub mod photodiode;
