//! GPIO / peripheral pin assignments for the absorbance sensor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Optics
// ---------------------------------------------------------------------------

/// Photodiode transimpedance output.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const PHOTODIODE_ADC_GPIO: i32 = 5;
/// ADC1 channel number for the photodiode.
pub const PHOTODIODE_ADC_CHANNEL: u32 = 4;

/// Digital output: illumination LED driver (active HIGH).
pub const ILLUMINATION_LED_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Unconnected analog input, read at boot to seed the noise stream.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const SEED_ADC_GPIO: i32 = 9;
/// ADC1 channel number for the floating seed input.
pub const SEED_ADC_CHANNEL: u32 = 8;

// ---------------------------------------------------------------------------
// ADC scaling
// ---------------------------------------------------------------------------

/// Native ADC resolution on ESP32-S3 (12-bit).
pub const ADC_NATIVE_MAX: f32 = 4095.0;
/// Range the pipeline expects raw readings in (10-bit, Arduino-style).
pub const ADC_PIPELINE_MAX: f32 = 1023.0;

// ---------------------------------------------------------------------------
// UART (frame link)
// ---------------------------------------------------------------------------

pub const UART_PORT: i32 = 0;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
