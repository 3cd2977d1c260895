//! Transport abstraction: any byte-oriented outbound channel.
//!
//! Concrete implementations:
//! - UART (ESP-IDF, see `adapters::hardware`)
//! - any `std::io::Write` (stdout, a file, a `Vec<u8>` in tests)
//!
//! The service is generic over `Transport`, so adding a new channel
//! requires zero changes to the pipeline.

use crate::error::LinkError;

use super::codec::Frame;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Encode `frame` and push it through `transport` in one write.
///
/// Returns the number of bytes sent.
pub fn send_frame<T: Transport>(transport: &mut T, frame: &Frame) -> Result<usize, LinkError> {
    let bytes = frame.to_bytes();
    if bytes.len() != frame.encoded_len() {
        return Err(LinkError::FrameOverflow);
    }

    let written = transport.write(&bytes).map_err(|e| {
        log::debug!("transport write error: {:?}", e);
        LinkError::WriteFailed
    })?;
    if written != bytes.len() {
        return Err(LinkError::ShortWrite {
            written,
            expected: bytes.len(),
        });
    }

    transport.flush().map_err(|_| LinkError::WriteFailed)?;
    Ok(written)
}

/// A null transport that discards all writes.
/// Useful when only the log output matters.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

/// Adapter over any [`std::io::Write`].
pub struct IoTransport<W> {
    inner: W,
}

impl<W: std::io::Write> IoTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> Transport for IoTransport<W> {
    type Error = std::io::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, std::io::Error> {
        self.inner.write_all(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.inner.flush()
    }
}
