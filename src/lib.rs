//! absorbsim library.
//!
//! One photodiode, several virtual absorbance sensors: raw light readings
//! are averaged per sampling interval, converted to absorbance against a
//! dark/full calibration, and fanned out to a bank of virtual sensors,
//! each with its own response time, background, sensitivity,
//! nonlinearity and noise.  Every tick produces one compact frame.
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; on the host the same pipeline runs against
//! simulated optics.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod link;
pub mod pins;
pub mod scheduler;
pub mod sensors;

pub use error::{Error, Result};
