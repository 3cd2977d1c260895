//! Outbound frame link and its receiver counterpart.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  SensorBank ──▶ Frame ──▶ codec ──▶ Transport (UART/stdout)│
//! │                                         │                  │
//! │                                         ▼                  │
//! │              Monitor ◀── FrameDecoder ◀── byte stream      │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod monitor;
pub mod transport;
