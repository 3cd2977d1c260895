//! Newline-terminated frame codec.
//!
//! Wire format (one frame per sampling interval):
//! ```text
//! ┌──────────────┬──────────┬───┬──────────┬─────────┬──────┐
//! │ calibrated   │ sensor 1 │ … │ sensor N │ count   │ 0x0A │
//! │ (optional)   │          │   │          │         │      │
//! └──────────────┴──────────┴───┴──────────┴─────────┴──────┘
//! ```
//!
//! `count` is the number of value bytes before it.  Value bytes are not
//! escaped, so a value of 10 looks like a terminator.  The decoder copes
//! by only accepting a newline as a frame end when the byte before it is
//! a consistent count; otherwise the newline is kept as a data byte.
//! Anything longer than [`MAX_FRAME_LEN`] is dropped and the decoder
//! resynchronises at the next newline.
//!
//! Once locked to `n` values, a newline after more than `n` buffered
//! bytes cannot sit inside a frame.  The decoder then takes the trailing
//! `n + 1` bytes as the frame if their count matches, and otherwise drops
//! the line; either way the discarded bytes count as a mismatch.

use heapless::Vec;

use crate::config::{MAX_FRAME_LEN, MAX_SENSORS};
use crate::sensors::BankOutputs;

/// Frame terminator.
pub const FRAME_TERMINATOR: u8 = b'\n';

/// Largest number of value bytes in one frame (calibrated byte included).
pub const MAX_FRAME_VALUES: usize = MAX_SENSORS + 1;

/// One tick's worth of outputs, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    calibrated: Option<u8>,
    sensors: BankOutputs,
}

impl Frame {
    pub fn new(calibrated: Option<u8>, sensors: BankOutputs) -> Self {
        Self {
            calibrated,
            sensors,
        }
    }

    pub fn calibrated(&self) -> Option<u8> {
        self.calibrated
    }

    pub fn sensors(&self) -> &[u8] {
        &self.sensors
    }

    /// Value bytes in this frame; also the `count` byte on the wire.
    pub fn value_count(&self) -> usize {
        usize::from(self.calibrated.is_some()) + self.sensors.len()
    }

    /// Encoded length including count byte and terminator.
    pub fn encoded_len(&self) -> usize {
        self.value_count() + 2
    }

    /// Encode into `out_buf`.  Returns the number of bytes written, or
    /// `None` if the buffer is too small.
    pub fn encode(&self, out_buf: &mut [u8]) -> Option<usize> {
        let total = self.encoded_len();
        if total > out_buf.len() {
            return None;
        }

        let mut pos = 0;
        if let Some(calibrated) = self.calibrated {
            out_buf[pos] = calibrated;
            pos += 1;
        }
        out_buf[pos..pos + self.sensors.len()].copy_from_slice(&self.sensors);
        pos += self.sensors.len();

        out_buf[pos] = self.value_count() as u8;
        out_buf[pos + 1] = FRAME_TERMINATOR;
        Some(total)
    }

    /// Encode into a fixed-capacity buffer.
    pub fn to_bytes(&self) -> Vec<u8, MAX_FRAME_LEN> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let mut out = Vec::new();
        if let Some(len) = self.encode(&mut buf) {
            // len <= MAX_FRAME_LEN by construction.
            let _ = out.extend_from_slice(&buf[..len]);
        }
        out
    }
}

/// Value bytes of one received frame (count byte and terminator removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    values: Vec<u8, MAX_FRAME_VALUES>,
}

impl DecodedFrame {
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Streaming frame decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes since the last accepted boundary (terminator excluded).
    line: Vec<u8, MAX_FRAME_LEN>,
    /// Overflowed: skip everything up to the next terminator.
    discarding: bool,
    /// Locked value count, once known.
    expected: Option<usize>,
    frames: u64,
    mismatches: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept frames carrying exactly `values` value bytes.
    pub fn lock_to(&mut self, values: usize) {
        self.expected = Some(values);
    }

    pub fn expected(&self) -> Option<usize> {
        self.expected
    }

    /// Frames accepted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lines dropped because no consistent frame could be formed.
    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }

    /// Push one byte.  Returns a frame when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<DecodedFrame> {
        if self.discarding {
            if byte == FRAME_TERMINATOR {
                self.discarding = false;
                self.line.clear();
            }
            return None;
        }

        if byte == FRAME_TERMINATOR {
            if let Some(frame) = self.take_frame() {
                return Some(frame);
            }
            if self.expected.is_some_and(|n| self.line.len() > n) {
                self.mismatches += 1;
                self.line.clear();
                return None;
            }
        }

        // Either a plain value byte or a 0x0A that did not close a frame.
        if self.line.push(byte).is_err() {
            self.mismatches += 1;
            self.line.clear();
            self.discarding = byte != FRAME_TERMINATOR;
        }
        None
    }

    /// Push a chunk of bytes, yielding every frame it completes.
    pub fn feed<'a>(&'a mut self, data: &'a [u8]) -> impl Iterator<Item = DecodedFrame> + 'a {
        data.iter().filter_map(move |&b| self.push(b))
    }

    /// Drop any partial frame (e.g. after reopening the port).
    pub fn reset(&mut self) {
        self.line.clear();
        self.discarding = false;
    }

    fn take_frame(&mut self) -> Option<DecodedFrame> {
        let (&count, values) = self.line.split_last()?;
        let count = usize::from(count);
        if count == 0 || count > MAX_FRAME_VALUES {
            return None;
        }
        let start = match self.expected {
            None if count == values.len() => 0,
            Some(n) if n == count && values.len() >= count => values.len() - count,
            _ => return None,
        };
        if start > 0 {
            // Leftover bytes from a torn frame.
            self.mismatches += 1;
        }

        let mut decoded = Vec::new();
        let _ = decoded.extend_from_slice(&values[start..]);
        self.line.clear();
        self.frames += 1;
        Some(DecodedFrame { values: decoded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(values: &[u8]) -> BankOutputs {
        Vec::from_slice(values).unwrap()
    }

    #[test]
    fn encodes_with_calibrated_byte() {
        let frame = Frame::new(Some(42), outputs(&[1, 2, 3]));
        assert_eq!(frame.value_count(), 4);
        assert_eq!(frame.to_bytes().as_slice(), &[42, 1, 2, 3, 4, b'\n']);
    }

    #[test]
    fn encodes_without_calibrated_byte() {
        let frame = Frame::new(None, outputs(&[7, 8]));
        assert_eq!(frame.to_bytes().as_slice(), &[7, 8, 2, b'\n']);
    }

    #[test]
    fn encode_rejects_small_buffer() {
        let frame = Frame::new(Some(0), outputs(&[1, 2, 3]));
        let mut buf = [0u8; 5];
        assert_eq!(frame.encode(&mut buf), None);
        let mut buf = [0u8; 6];
        assert_eq!(frame.encode(&mut buf), Some(6));
    }

    #[test]
    fn decodes_consecutive_frames() {
        let mut dec = FrameDecoder::new();
        let stream = [5, 6, 7, 3, b'\n', 8, 9, 10 + 1, 3, b'\n'];
        let frames: std::vec::Vec<_> = dec.feed(&stream).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].values(), &[5, 6, 7]);
        assert_eq!(frames[1].values(), &[8, 9, 11]);
        assert_eq!(dec.frames(), 2);
    }

    #[test]
    fn value_equal_to_newline_is_kept() {
        let mut dec = FrameDecoder::new();
        let frame = Frame::new(Some(10), outputs(&[200, 10, 3]));
        let bytes = frame.to_bytes();
        let frames: std::vec::Vec<_> = dec.feed(&bytes).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].values(), &[10, 200, 10, 3]);
    }

    #[test]
    fn resynchronises_after_joining_mid_frame() {
        let mut dec = FrameDecoder::new();
        let good = Frame::new(None, outputs(&[50, 60, 70])).to_bytes();

        // Tail of a frame, then several whole frames.
        let mut stream = std::vec::Vec::new();
        stream.extend_from_slice(&[60, 70, 3, b'\n']);
        for _ in 0..4 {
            stream.extend_from_slice(&good);
        }

        let frames: std::vec::Vec<_> = dec.feed(&stream).collect();
        assert!(!frames.is_empty());
        assert!(frames.iter().all(|f| f.values() == [50, 60, 70]));
        assert!(dec.mismatches() >= 1);
    }

    #[test]
    fn locked_decoder_ignores_other_lengths() {
        let mut dec = FrameDecoder::new();
        dec.lock_to(2);
        assert!(dec.feed(&[1, 1, b'\n']).next().is_none());
        dec.reset();
        let frames: std::vec::Vec<_> = dec.feed(&[4, 5, 2, b'\n']).collect();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn locked_decoder_recovers_frame_behind_garbage() {
        let mut dec = FrameDecoder::new();
        dec.lock_to(2);

        let frames: std::vec::Vec<_> = dec.feed(&[9, 9, 9, 4, 5, 2, b'\n']).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].values(), &[4, 5]);
        assert_eq!(dec.mismatches(), 1);

        // Too long for the lock and wrong count: dropped at the newline.
        assert!(dec.feed(&[1, 2, 3, 3, b'\n']).next().is_none());
        assert_eq!(dec.mismatches(), 2);

        let frames: std::vec::Vec<_> = dec.feed(&[6, 7, 2, b'\n']).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].values(), &[6, 7]);
    }

    #[test]
    fn locked_decoder_keeps_newline_values_inside_frame() {
        let mut dec = FrameDecoder::new();
        dec.lock_to(3);
        let frames: std::vec::Vec<_> = dec.feed(&[10, 1, 10, 3, b'\n']).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].values(), &[10, 1, 10]);
        assert_eq!(dec.mismatches(), 0);
    }

    #[test]
    fn zero_count_is_never_a_frame() {
        let mut dec = FrameDecoder::new();
        assert!(dec.feed(&[0, b'\n']).next().is_none());
        assert!(dec.feed(&[b'\n']).next().is_none());
    }
}
