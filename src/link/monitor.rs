//! Receiver-side monitor for the frame stream.
//!
//! Learns the channel count from the first valid frame, then locks the
//! decoder to it.  Until locked, a value byte of 10 can make a frame
//! prefix look complete, so callers that know the layout should lock up
//! front with [`Monitor::with_channels`].
//!
//! Keeps a rolling trace of the most recent samples per channel and
//! converts output bytes to the 0–5 V scale of the analog sensors being
//! imitated.

use heapless::{HistoryBuffer, Vec};

use super::codec::{DecodedFrame, FrameDecoder, MAX_FRAME_VALUES};

/// Samples kept per channel.
pub const TRACE_LEN: usize = 512;

/// Voltage represented by a full 256-step byte.
pub const FULL_SCALE_VOLTS: f32 = 5.0;

/// Map an output byte onto the 0–5 V display scale.
pub fn byte_to_volts(value: u8) -> f32 {
    f32::from(value) / 256.0 * FULL_SCALE_VOLTS
}

/// One decoded frame, timestamped and scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Time since the first frame (milliseconds).
    pub t_ms: u64,
    pub volts: Vec<f32, MAX_FRAME_VALUES>,
}

pub struct Monitor {
    decoder: FrameDecoder,
    sample_interval_ms: u32,
    traces: std::vec::Vec<HistoryBuffer<f32, TRACE_LEN>>,
    samples: u64,
}

impl Monitor {
    pub fn new(sample_interval_ms: u32) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            sample_interval_ms,
            traces: std::vec::Vec::new(),
            samples: 0,
        }
    }

    /// A monitor that only accepts frames of exactly `channels` values.
    pub fn with_channels(sample_interval_ms: u32, channels: usize) -> Self {
        let mut monitor = Self::new(sample_interval_ms);
        monitor.decoder.lock_to(channels);
        monitor.traces = (0..channels).map(|_| HistoryBuffer::new()).collect();
        monitor
    }

    /// Channel count, once the first frame has arrived.
    pub fn channels(&self) -> Option<usize> {
        self.decoder.expected()
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn mismatches(&self) -> u64 {
        self.decoder.mismatches()
    }

    /// Rolling trace of one channel, oldest first.
    pub fn trace(&self, channel: usize) -> Option<impl Iterator<Item = f32> + '_> {
        self.traces
            .get(channel)
            .map(|buf| buf.oldest_ordered().copied())
    }

    /// Push received bytes; returns the samples they completed.
    pub fn ingest(&mut self, data: &[u8]) -> std::vec::Vec<Sample> {
        // Byte at a time: the lock taken on the first frame must already
        // apply to the next one in the same chunk.
        let mut samples = std::vec::Vec::new();
        for &byte in data {
            if let Some(frame) = self.decoder.push(byte) {
                samples.push(self.record(&frame));
            }
        }
        samples
    }

    fn record(&mut self, frame: &DecodedFrame) -> Sample {
        if self.traces.is_empty() {
            log::info!("monitor: locked to {} channels", frame.len());
            self.decoder.lock_to(frame.len());
            self.traces = (0..frame.len()).map(|_| HistoryBuffer::new()).collect();
        }

        let mut volts = Vec::new();
        for (trace, &value) in self.traces.iter_mut().zip(frame.values()) {
            let v = byte_to_volts(value);
            trace.write(v);
            let _ = volts.push(v);
        }

        let t_ms = self.samples * u64::from(self.sample_interval_ms);
        self.samples += 1;
        Sample { t_ms, volts }
    }
}
