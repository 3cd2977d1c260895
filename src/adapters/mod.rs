//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                |
//! |-------------|---------------------|----------------------------|
//! | `hardware`  | RawSourcePort       | ESP32 ADC (photodiode)     |
//! |             | IlluminationPort    | ESP32 GPIO (LED)           |
//! |             | EntropyPort         | Floating ADC pin           |
//! |             | Transport           | ESP32 UART                 |
//! | `optics`    | RawSourcePort       | Simulated optical bench    |
//! |             | IlluminationPort    |                            |
//! |             | EntropyPort         |                            |
//! | `log_sink`  | EventSink           | `log` facade               |
//! | `time`      | -                   | ESP32 system timer/Instant |
//! | `delay`     | DelayNs             | `std::thread::sleep`       |

#[cfg(not(target_os = "espidf"))]
pub mod delay;
pub mod hardware;
pub mod log_sink;
pub mod optics;
pub mod time;
