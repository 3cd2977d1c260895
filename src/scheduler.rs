//! Sampling-tick scheduler.
//!
//! The main loop polls the raw source continuously and asks the
//! scheduler, on every pass, whether a tick boundary has been reached.
//! The scheduler owns nothing but the tick phase; it knows nothing about
//! sensors, frames or transports.
//!
//! ```text
//!  now_ms ─▶ TickScheduler::due() ─▶ true ─▶ drain · calibrate · bank · frame
//!                                 └▶ false ─▶ keep accumulating
//! ```
//!
//! Ticks stay on a fixed phase (`anchor + k · interval`) so jitter in
//! the polling loop does not accumulate as drift.  When the loop stalls
//! for more than one interval, a single tick fires and the phase is
//! re-anchored; missed ticks are counted, never replayed in a burst.

use log::debug;

#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval_ms: u64,
    next_due_ms: Option<u64>,
    ticks: u64,
    missed: u64,
}

impl TickScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms.max(1)),
            next_due_ms: None,
            ticks: 0,
            missed: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Ticks fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Intervals skipped because the loop stalled.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Start the first interval at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = Some(now_ms + self.interval_ms);
    }

    /// `true` once per elapsed interval.
    ///
    /// The first call on an unstarted scheduler starts it and returns
    /// `false`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let Some(next) = self.next_due_ms else {
            self.start(now_ms);
            return false;
        };
        if now_ms < next {
            return false;
        }

        let late_by = now_ms - next;
        if late_by >= self.interval_ms {
            let skipped = late_by / self.interval_ms;
            self.missed += skipped;
            debug!("scheduler: loop stalled, {} tick(s) skipped", skipped);
            self.next_due_ms = Some(now_ms + self.interval_ms);
        } else {
            self.next_due_ms = Some(next + self.interval_ms);
        }

        self.ticks += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut s = TickScheduler::new(25);
        assert!(!s.due(1000)); // starts
        assert!(!s.due(1010));
        assert!(!s.due(1024));
        assert!(s.due(1025));
        assert!(!s.due(1026));
        assert!(s.due(1050));
        assert_eq!(s.ticks(), 2);
    }

    #[test]
    fn jitter_does_not_drift() {
        let mut s = TickScheduler::new(25);
        s.start(0);
        // Polled a few ms late every time.
        assert!(s.due(28));
        assert!(!s.due(49));
        assert!(s.due(53));
        assert!(s.due(75));
        assert_eq!(s.missed(), 0);
    }

    #[test]
    fn stall_fires_once_and_reanchors() {
        let mut s = TickScheduler::new(25);
        s.start(0);
        assert!(s.due(110)); // 85 ms late: 3 intervals skipped
        assert_eq!(s.missed(), 3);
        assert!(!s.due(120));
        assert!(!s.due(134));
        assert!(s.due(135));
        assert_eq!(s.ticks(), 2);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut s = TickScheduler::new(0);
        assert_eq!(s.interval_ms(), 1);
        s.start(0);
        assert!(s.due(1));
    }
}
