//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the pipeline orchestration: startup calibration,
//! per-poll accumulation and per-tick frame production.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
