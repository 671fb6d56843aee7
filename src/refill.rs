//! The refill buffer shared by the blocking and async stream sources.
use alloc::{vec, vec::Vec};
use tracing::trace;

use super::{IoError, IoResult};

/// A single growable buffer holding the bytes read from a stream but not
/// yet consumed.
///
/// Unconsumed bytes live in `buf[start..end]`. Before a refill they are
/// slid to the front, and the buffer only grows when a single peek asks for
/// more bytes than it can hold.
#[derive(Debug)]
pub(crate) struct RefillBuffer {
    buf: Vec<u8>,
    start: usize,
    end: usize
}

impl RefillBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        RefillBuffer { buf: vec![0; capacity.max(1)], start: 0, end: 0 }
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Up to `len` unconsumed bytes.
    #[inline]
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.buf[self.start..self.start + len.min(self.available())]
    }

    /// Make room for `len` contiguous unconsumed bytes and return the spare tail.
    pub fn spare(&mut self, len: usize) -> &mut [u8] {
        if self.buf.len() - self.start < len || self.end == self.buf.len() {
            if self.start != 0 {
                self.buf.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            }
            if self.buf.len() < len {
                let new_len = len.max(self.buf.len() * 2);
                trace!(from = self.buf.len(), to = new_len, "growing refill buffer");
                self.buf.resize(new_len, 0);
            }
        }
        &mut self.buf[self.end..]
    }

    /// Mark `len` bytes of the spare tail as filled.
    #[inline]
    pub fn fill(&mut self, len: usize) {
        self.end += len;
    }

    pub fn consume(&mut self, len: usize) -> IoResult<()> {
        if len > self.available() {
            return Err(IoError::InvalidAdvance)
        }
        self.start += len;
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_slides_and_grows() {
        let mut buffer = RefillBuffer::with_capacity(4);
        let spare = buffer.spare(3);
        assert_eq!(spare.len(), 4);
        spare[..4].copy_from_slice(b"abcd");
        buffer.fill(4);
        assert_eq!(buffer.filled(2), b"ab");
        buffer.consume(3).unwrap();
        assert_eq!(buffer.available(), 1);
        // slide "d" to the front
        let spare = buffer.spare(4);
        assert_eq!(spare.len(), 3);
        spare.copy_from_slice(b"efg");
        buffer.fill(3);
        assert_eq!(buffer.filled(10), b"defg");
        assert_eq!(buffer.capacity(), 4);
        // grow
        let spare = buffer.spare(6);
        assert_eq!(spare.len(), 4);
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.filled(10), b"defg");
        assert_eq!(buffer.consume(5), Err(IoError::InvalidAdvance));
        buffer.consume(4).unwrap();
        assert_eq!(buffer.available(), 0);
        assert_eq!(buffer.spare(1).len(), 8);
    }
}
