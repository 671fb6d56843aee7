//! Byte sources and sinks for MessagePack codecs.
//!
//! A codec pulls bytes from a [`ReadSource`] with [`ReadSource::peek`] and
//! [`ReadSource::advance`], and pushes bytes into a [`WriteTarget`].
//!
//! Both traits return futures, so a single decoding or encoding routine
//! serves blocking and non-blocking I/O alike. In-memory implementations
//! ([`SliceReader`], [`SliceWriter`], `Vec<u8>`, ...) and blocking stream
//! adapters never suspend: their futures are ready on the first poll.
//! The adapters from the `tokio` feature suspend while waiting on the
//! underlying stream.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

use core::fmt;
use core::future::Future;

mod foreign;
#[cfg(feature = "alloc")]
mod refill;
#[cfg(feature = "std")]
mod stream;
#[cfg(feature = "tokio")]
mod asynch;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub use stream::{StreamSource, StreamTarget};

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub use asynch::{AsyncStreamSource, AsyncStreamTarget};

/// Initial size of the refill buffer of stream sources and of the staging
/// buffer of stream targets.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Largest chunk [`ReadSource::discard`] asks for at once.
pub const DISCARD_CHUNK: usize = 4096;

pub type IoResult<T> = Result<T, IoError>;

/// An error returned by [`ReadSource`] and [`WriteTarget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum IoError {
    /// Buffer is full
    BufferFull,
    /// Input ended before the requested number of bytes
    UnexpectedEof,
    /// Advanced past the bytes returned by a previous peek
    InvalidAdvance,
    /// An error from the underlying stream
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    Io(std::io::ErrorKind),
}

#[cfg(feature = "std")]
impl std::error::Error for IoError {}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::BufferFull => f.write_str("buffer is full"),
            IoError::UnexpectedEof => f.write_str("unexpected end of input"),
            IoError::InvalidAdvance => f.write_str("advanced beyond peeked input"),
            #[cfg(feature = "std")]
            IoError::Io(kind) => write!(f, "stream error: {}", kind),
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => IoError::UnexpectedEof,
            kind => IoError::Io(kind)
        }
    }
}

/// Decoders pull their input from the implementations of this trait.
pub trait ReadSource {
    /// Return up to `len` bytes of input without consuming them.
    ///
    /// A shorter slice is returned only when the input has no more bytes.
    fn peek(&mut self, len: usize) -> impl Future<Output = IoResult<&[u8]>>;
    /// Consume `len` bytes already returned by [`ReadSource::peek`].
    ///
    /// When `len` exceeds the buffered input return `Err(IoError::InvalidAdvance)`.
    fn advance(&mut self, len: usize) -> IoResult<()>;
    /// Drop `len` bytes of input, which need not fit in a single peek.
    ///
    /// When the input ends early return `Err(IoError::UnexpectedEof)`.
    fn discard(&mut self, len: usize) -> impl Future<Output = IoResult<()>> {
        async move {
            let mut left = len;
            while left != 0 {
                let got = self.peek(left.min(DISCARD_CHUNK)).await?.len();
                if got == 0 {
                    return Err(IoError::UnexpectedEof)
                }
                self.advance(got)?;
                left -= got;
            }
            Ok(())
        }
    }
}

impl<T: ReadSource> ReadSource for &'_ mut T {
    fn peek(&mut self, len: usize) -> impl Future<Output = IoResult<&[u8]>> {
        (**self).peek(len)
    }
    fn advance(&mut self, len: usize) -> IoResult<()> {
        (**self).advance(len)
    }
    fn discard(&mut self, len: usize) -> impl Future<Output = IoResult<()>> {
        (**self).discard(len)
    }
}

/// Encoders should write data to the implementations of this trait.
pub trait WriteTarget {
    /// Write all bytes from `buf`.
    ///
    /// When over capacity return `Err(IoError::BufferFull)`.
    fn write(&mut self, buf: &[u8]) -> impl Future<Output = IoResult<()>>;
    /// Write a single `byte`.
    ///
    /// When over capacity return `Err(IoError::BufferFull)`.
    fn write_byte(&mut self, byte: u8) -> impl Future<Output = IoResult<()>> {
        async move {
            self.write(core::slice::from_ref(&byte)).await
        }
    }
    /// Write a string.
    ///
    /// When over capacity return `Err(IoError::BufferFull)`.
    fn write_str(&mut self, s: &str) -> impl Future<Output = IoResult<()>> {
        self.write(s.as_bytes())
    }
    /// Push any staged bytes down to the underlying stream.
    fn flush(&mut self) -> impl Future<Output = IoResult<()>> {
        async { Ok(()) }
    }
}

impl<T: WriteTarget> WriteTarget for &'_ mut T {
    fn write(&mut self, buf: &[u8]) -> impl Future<Output = IoResult<()>> {
        (**self).write(buf)
    }
    fn write_byte(&mut self, byte: u8) -> impl Future<Output = IoResult<()>> {
        (**self).write_byte(byte)
    }
    fn flush(&mut self) -> impl Future<Output = IoResult<()>> {
        (**self).flush()
    }
}

/// A cursor over a borrowed slice of input.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceReader<'a> {
    buf: &'a [u8],
    pos: usize
}

impl<'a> SliceReader<'a> {
    /// Create new instance
    pub fn new(buf: &'a [u8]) -> Self {
        SliceReader { buf, pos: 0 }
    }
    /// Return the number of consumed bytes
    pub fn position(&self) -> usize {
        self.pos
    }
    /// Return the unconsumed portion of the input with the input's lifetime
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
    /// Return the number of unconsumed bytes
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }
    /// Consume exactly `len` bytes and return them with the input's lifetime.
    pub fn take(&mut self, len: usize) -> IoResult<&'a [u8]> {
        let rest = self.remaining();
        let (res, _) = rest.split_at_checked(len).ok_or(IoError::UnexpectedEof)?;
        self.pos += len;
        Ok(res)
    }
}

impl ReadSource for SliceReader<'_> {
    async fn peek(&mut self, len: usize) -> IoResult<&[u8]> {
        let rest = self.remaining();
        Ok(&rest[..len.min(rest.len())])
    }

    fn advance(&mut self, len: usize) -> IoResult<()> {
        if len > self.remaining_len() {
            return Err(IoError::InvalidAdvance)
        }
        self.pos += len;
        Ok(())
    }

    async fn discard(&mut self, len: usize) -> IoResult<()> {
        if len > self.remaining_len() {
            return Err(IoError::UnexpectedEof)
        }
        self.pos += len;
        Ok(())
    }
}

/// A simple slice writer
#[derive(Debug, PartialEq)]
pub struct SliceWriter<'a> {
    pub buf: &'a mut [u8],
    pub len: usize
}

impl<'a> AsRef<[u8]> for SliceWriter<'a> {
    /// Returns a populated portion of the slice
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<'a> AsMut<[u8]> for SliceWriter<'a> {
    /// Returns a populated portion of the slice
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }
}

impl<'a> SliceWriter<'a> {
    /// Create new instance
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, len: 0 }
    }
    /// Return populated length
    pub fn len(&self) -> usize {
        self.len
    }
    /// Return `true` when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Return total capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
    /// Return remaining capacity
    pub fn rem_capacity(&self) -> usize {
        self.buf.len() - self.len
    }
    /// Split the underlying buffer and return the portion of the populated buffer
    /// with an underlying buffer's borrowed lifetime.
    pub fn split(self) -> (&'a mut[u8], Self) {
        let (res, buf) = self.buf.split_at_mut(self.len);
        (res, Self { buf, len: 0 })
    }
    /// Destruct into an underlying buffer
    pub fn into_buf(self) -> &'a mut [u8] {
        self.buf
    }
    fn push(&mut self, buf: &[u8]) -> IoResult<()> {
        let end = self.len + buf.len();
        match self.buf.get_mut(self.len..end) {
            Some(chunk) => {
                chunk.copy_from_slice(buf);
                self.len = end;
                Ok(())
            }
            None => Err(IoError::BufferFull)
        }
    }
}

impl WriteTarget for SliceWriter<'_> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.push(buf)
    }
}
