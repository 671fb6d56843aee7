//! Blocking stream adapters.
use std::io::{self, Read, Write};
use std::vec::Vec;
use tracing::trace;

use super::*;
use super::refill::RefillBuffer;

/// A [`ReadSource`] over a blocking [`std::io::Read`] stream.
///
/// Bytes are read ahead into a single refill buffer, which grows only as
/// much as the largest single peek requires. Pass the stream by value to
/// hand it over, or as `&mut` to keep it.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    buffer: RefillBuffer
}

impl<R: Read> StreamSource<R> {
    /// Create new instance with the default buffer size
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }
    /// Create new instance with the initial buffer `capacity`
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        StreamSource { inner, buffer: RefillBuffer::with_capacity(capacity) }
    }
    /// Return a reference to the underlying stream
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
    /// Return the number of bytes read ahead but not consumed yet
    pub fn buffered(&self) -> usize {
        self.buffer.available()
    }
    /// Destruct into the underlying stream, dropping any bytes read ahead
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ReadSource for StreamSource<R> {
    async fn peek(&mut self, len: usize) -> IoResult<&[u8]> {
        while self.buffer.available() < len {
            let spare = self.buffer.spare(len);
            match self.inner.read(spare) {
                Ok(0) => break,
                Ok(n) => self.buffer.fill(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into())
            }
        }
        Ok(self.buffer.filled(len))
    }

    fn advance(&mut self, len: usize) -> IoResult<()> {
        self.buffer.consume(len)
    }
}

/// A [`WriteTarget`] over a blocking [`std::io::Write`] stream.
///
/// Bytes are staged in a buffer which is drained to the stream when it
/// fills up and on [`WriteTarget::flush`]. Writes larger than the staging
/// buffer go straight to the stream. Staged bytes are lost when the target
/// is dropped without a flush.
#[derive(Debug)]
pub struct StreamTarget<W: Write> {
    inner: W,
    staging: Vec<u8>,
    capacity: usize
}

impl<W: Write> StreamTarget<W> {
    /// Create new instance with the default staging buffer size
    pub fn new(inner: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }
    /// Create new instance with the staging buffer `capacity`
    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        StreamTarget { inner, staging: Vec::with_capacity(capacity), capacity }
    }
    /// Return a reference to the underlying stream
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
    /// Return the number of staged bytes
    pub fn staged(&self) -> usize {
        self.staging.len()
    }
    /// Drain the staging buffer and destruct into the underlying stream
    pub fn into_inner(mut self) -> IoResult<W> {
        self.drain()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn drain(&mut self) -> IoResult<()> {
        if !self.staging.is_empty() {
            trace!(len = self.staging.len(), "draining staged bytes");
            self.inner.write_all(&self.staging)?;
            self.staging.clear();
        }
        Ok(())
    }
}

impl<W: Write> WriteTarget for StreamTarget<W> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        if self.staging.len() + buf.len() > self.capacity {
            self.drain()?;
        }
        if buf.len() >= self.capacity {
            self.inner.write_all(buf)?;
        }
        else {
            self.staging.extend_from_slice(buf);
        }
        Ok(())
    }

    async fn flush(&mut self) -> IoResult<()> {
        self.drain()?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{vec, vec::Vec};
    use futures::FutureExt;
    use super::*;

    /// Hands out at most `chunk` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.chunk).min(self.data.len());
            let (head, tail) = self.data.split_at(len);
            buf[..len].copy_from_slice(head);
            self.data = tail;
            Ok(len)
        }
    }

    #[test]
    fn test_stream_source_refills_until_satisfied() {
        let data: Vec<u8> = (0..3000u32).map(|i| i as u8).collect();
        let mut source = StreamSource::new(Trickle { data: &data, chunk: 7 });
        let head = source.peek(3).now_or_never().unwrap().unwrap();
        assert_eq!(head, &[0, 1, 2]);
        source.advance(2).unwrap();
        let big = source.peek(2500).now_or_never().unwrap().unwrap();
        assert_eq!(big.len(), 2500);
        assert_eq!(big[0], 2);
        assert_eq!(big[2499], data[2501]);
        source.advance(2500).unwrap();
        let rest = source.peek(1000).now_or_never().unwrap().unwrap();
        assert_eq!(rest.len(), 498);
        assert_eq!(source.advance(499), Err(IoError::InvalidAdvance));
        source.discard(498).now_or_never().unwrap().unwrap();
        assert_eq!(source.peek(1).now_or_never().unwrap().unwrap(), &[]);
        assert_eq!(source.discard(1).now_or_never().unwrap(), Err(IoError::UnexpectedEof));
    }

    #[test]
    fn test_stream_source_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::ErrorKind::ConnectionReset.into())
            }
        }
        let mut source = StreamSource::new(Broken);
        assert_eq!(source.peek(1).now_or_never().unwrap(),
                   Err(IoError::Io(io::ErrorKind::ConnectionReset)));
    }

    #[test]
    fn test_stream_target_stages() {
        let mut target = StreamTarget::with_capacity(8, Vec::new());
        target.write(b"abc").now_or_never().unwrap().unwrap();
        target.write_byte(b'd').now_or_never().unwrap().unwrap();
        assert_eq!(target.staged(), 4);
        assert!(target.get_ref().is_empty());
        target.write(b"efghi").now_or_never().unwrap().unwrap();
        assert_eq!(target.get_ref(), b"abcd");
        assert_eq!(target.staged(), 5);
        target.write(b"0123456789").now_or_never().unwrap().unwrap();
        assert_eq!(target.get_ref(), b"abcdefghi0123456789");
        target.write(b"xy").now_or_never().unwrap().unwrap();
        target.flush().now_or_never().unwrap().unwrap();
        assert_eq!(target.staged(), 0);
        let inner = target.into_inner().unwrap();
        assert_eq!(inner, b"abcdefghi0123456789xy");
        let mut target = StreamTarget::new(vec![]);
        target.write_str("tail").now_or_never().unwrap().unwrap();
        assert_eq!(target.into_inner().unwrap(), b"tail");
    }
}
