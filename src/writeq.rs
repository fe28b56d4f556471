//! A gather-write output queue.
//!
//! The engine streams a slice out as hundreds or thousands of small,
//! independently-sourced byte runs (rows of the mmap'd input, runs of a
//! shared owned zero buffer, the rewritten header). Rather than copying
//! every run into one contiguous buffer before writing, we queue up
//! borrowed slices and hand them to the OS in one `write_vectored` call,
//! flushing early if the queue fills up a fixed-size batch.

use std::io::{IoSlice, Write};

use crate::error::{Result, SliceError};

/// Matches the donor C engine's `iovec` batch size. Picked large enough
/// that a typical slice flushes only a handful of times.
const MAX_IOVEC: usize = 1024;

pub struct WriteQueue<'a, W: Write> {
    sink: W,
    segments: Vec<&'a [u8]>,
}

impl<'a, W: Write> WriteQueue<'a, W> {
    pub fn new(sink: W) -> Self {
        WriteQueue {
            sink,
            segments: Vec::with_capacity(MAX_IOVEC),
        }
    }

    /// Queue a borrowed byte run for output. Empty runs are dropped
    /// immediately rather than taking up a batch slot.
    pub fn push(&mut self, buf: &'a [u8]) -> Result<()> {
        if self.segments.len() >= MAX_IOVEC {
            self.flush()?;
        }
        if !buf.is_empty() {
            self.segments.push(buf);
        }
        Ok(())
    }

    /// Write out everything queued so far. Handles short/interrupted
    /// vectored writes (a signal, or a full disk recovering) by retrying
    /// with the remaining, partially-consumed tail of the batch.
    pub fn flush(&mut self) -> Result<()> {
        while !self.segments.is_empty() {
            let slices: Vec<IoSlice> = self.segments.iter().map(|s| IoSlice::new(s)).collect();
            let n = self.sink.write_vectored(&slices)?;
            if n == 0 {
                return Err(SliceError::Eio(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "write_vectored wrote 0 bytes",
                )));
            }

            let mut remaining = n;
            let mut consumed = 0;
            for seg in &self.segments {
                if remaining >= seg.len() {
                    remaining -= seg.len();
                    consumed += 1;
                } else {
                    break;
                }
            }
            self.segments.drain(0..consumed);
            if remaining > 0 {
                self.segments[0] = &self.segments[0][remaining..];
            }
        }
        Ok(())
    }

    /// Consume the queue, flushing anything left, and return the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_flush_into_order() {
        let mut out = Vec::new();
        {
            let mut q = WriteQueue::new(&mut out);
            q.push(b"hello ").unwrap();
            q.push(b"world").unwrap();
            q.flush().unwrap();
        }
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn empty_pushes_are_dropped() {
        let mut out = Vec::new();
        let mut q = WriteQueue::new(&mut out);
        q.push(b"").unwrap();
        q.push(b"a").unwrap();
        q.push(b"").unwrap();
        q.into_inner().unwrap();
        assert_eq!(out, b"a");
    }

    #[test]
    fn batch_boundary_flushes_automatically() {
        let mut out = Vec::new();
        let mut q = WriteQueue::new(&mut out);
        for _ in 0..(MAX_IOVEC + 10) {
            q.push(b"x").unwrap();
        }
        q.into_inner().unwrap();
        assert_eq!(out.len(), MAX_IOVEC + 10);
    }
}
