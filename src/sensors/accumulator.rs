//! Per-interval averaging of raw photodiode reads.
//!
//! The main loop polls the raw source as fast as it can and adds every
//! reading here; at each tick boundary the service drains the average
//! and the accumulator starts over empty.

/// Running sum and count since the last drain.
#[derive(Debug, Default, Clone)]
pub struct SampleAccumulator {
    sum: f32,
    count: u32,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw_reading: f32) {
        self.sum += raw_reading;
        self.count = self.count.saturating_add(1);
    }

    /// Average of everything added since the last drain, then reset.
    ///
    /// Returns `None` (and leaves the state untouched) when nothing was
    /// added, so an empty interval can never produce a NaN average.
    pub fn drain(&mut self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let average = self.sum / self.count as f32;
        self.sum = 0.0;
        self.count = 0;
        Some(average)
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
