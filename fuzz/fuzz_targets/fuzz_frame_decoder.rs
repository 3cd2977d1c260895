//! Fuzz target: `FrameDecoder::feed` / `Monitor::ingest`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics, that every frame it yields is
//! consistent with its count byte, and that a reset decoder behaves
//! exactly like a fresh one.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use absorbsim::link::codec::{FrameDecoder, MAX_FRAME_VALUES};
use absorbsim::link::monitor::Monitor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();
    let first: Vec<_> = decoder.feed(data).collect();
    for frame in &first {
        assert!(!frame.is_empty(), "decoder must not yield empty frames");
        assert!(frame.len() <= MAX_FRAME_VALUES, "frame exceeds MAX_FRAME_VALUES");
    }

    // After a reset (counters aside) the decoder must start clean.
    decoder.reset();
    let second: Vec<_> = decoder.feed(data).collect();
    assert_eq!(first, second);

    // The monitor locks onto the first frame and must never panic.
    let mut monitor = Monitor::new(25);
    for sample in monitor.ingest(data) {
        assert!(sample.volts.iter().all(|v| (0.0..5.0).contains(v)));
    }
});
