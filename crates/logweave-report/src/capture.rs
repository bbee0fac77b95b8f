// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Scoped capture of a text sink
//!
//! [`CaptureSink`] wraps a real sink so that, while a capture session is
//! open, every write is both forwarded unchanged to the destination and
//! appended to an internal buffer. The recorder opens one session per sink
//! for the duration of a suite and attaches the released text to it.
//!
//! One session per sink at a time; [`CaptureSink::begin`] while a session is
//! already open is a no-op.

use std::io::{self, Write};

/// A pass-through sink with an optional capture buffer
#[derive(Debug)]
pub struct CaptureSink<W: Write> {
    inner: W,
    buffer: Option<Vec<u8>>,
}

impl<W: Write> CaptureSink<W> {
    /// Wrap a sink in pass-through-only mode
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: None,
        }
    }

    /// Open a capture session
    ///
    /// Subsequent writes are buffered as well as forwarded. No-op if a
    /// session is already open.
    pub fn begin(&mut self) {
        if self.buffer.is_none() {
            self.buffer = Some(Vec::new());
        }
    }

    /// Whether a capture session is open
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.buffer.is_some()
    }

    /// Bytes accumulated since [`begin`](Self::begin), if a session is open
    #[must_use]
    pub fn captured(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Close the session and return the captured text
    ///
    /// The sink reverts to pass-through-only behavior. Returns an empty
    /// string if no session was open. Captured bytes are decoded lossily.
    pub fn release(&mut self) -> String {
        match self.buffer.take() {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => String::new(),
        }
    }

    /// Consume the wrapper and return the inner sink
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CaptureSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.extend_from_slice(&buf[..written]);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_pass_through_without_session() {
        let mut sink = CaptureSink::new(Vec::new());
        sink.write_all(b"hello\n").expect("write");

        assert!(!sink.is_capturing());
        assert_eq!(sink.release(), "");
        assert_eq!(sink.into_inner(), b"hello\n".to_vec());
    }

    #[test]
    fn test_capture_tees_writes() {
        let mut sink = CaptureSink::new(Vec::new());
        sink.write_all(b"before\n").expect("write");
        sink.begin();
        sink.write_all(b"during\n").expect("write");

        assert_eq!(sink.captured(), Some(b"during\n".as_slice()));
        assert_eq!(sink.release(), "during\n");
        assert!(!sink.is_capturing());

        sink.write_all(b"after\n").expect("write");
        // Everything still reached the real destination.
        assert_eq!(sink.into_inner(), b"before\nduring\nafter\n".to_vec());
    }

    #[test]
    fn test_begin_is_idempotent() {
        let mut sink = CaptureSink::new(Vec::new());
        sink.begin();
        sink.write_all(b"one").expect("write");
        sink.begin();
        sink.write_all(b"two").expect("write");

        assert_eq!(sink.release(), "onetwo");
    }

    #[test]
    fn test_release_resets_for_next_session() {
        let mut sink = CaptureSink::new(Vec::new());
        sink.begin();
        sink.write_all(b"first").expect("write");
        assert_eq!(sink.release(), "first");

        sink.begin();
        sink.write_all(b"second").expect("write");
        assert_eq!(sink.release(), "second");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut sink = CaptureSink::new(Vec::new());
        sink.begin();
        sink.write_all(&[0x66, 0xff, 0x6f]).expect("write");
        assert_eq!(sink.release(), "f\u{fffd}o");
    }
}
