//! Non-blocking stream adapters over tokio's I/O traits.
use std::vec::Vec;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::*;
use super::refill::RefillBuffer;

/// A [`ReadSource`] over an [`AsyncRead`] stream.
///
/// Behaves exactly like [`StreamSource`](crate::StreamSource) but suspends
/// while waiting for the stream.
#[derive(Debug)]
pub struct AsyncStreamSource<R> {
    inner: R,
    buffer: RefillBuffer
}

impl<R: AsyncRead + Unpin> AsyncStreamSource<R> {
    /// Create new instance with the default buffer size
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }
    /// Create new instance with the initial buffer `capacity`
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        AsyncStreamSource { inner, buffer: RefillBuffer::with_capacity(capacity) }
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

impl<R: AsyncRead + Unpin> ReadSource for AsyncStreamSource<R> {
    async fn peek(&mut self, len: usize) -> IoResult<&[u8]> {
        while self.buffer.available() < len {
            let spare = self.buffer.spare(len);
            match self.inner.read(spare).await {
                Ok(0) => break,
                Ok(n) => self.buffer.fill(n),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into())
            }
        }
        Ok(self.buffer.filled(len))
    }

    fn advance(&mut self, len: usize) -> IoResult<()> {
        self.buffer.consume(len)
    }
}

/// A [`WriteTarget`] over an [`AsyncWrite`] stream.
///
/// Behaves exactly like [`StreamTarget`](crate::StreamTarget) but suspends
/// while the stream accepts the staged bytes.
#[derive(Debug)]
pub struct AsyncStreamTarget<W> {
    inner: W,
    staging: Vec<u8>,
    capacity: usize
}

impl<W: AsyncWrite + Unpin> AsyncStreamTarget<W> {
    /// Create new instance with the default staging buffer size
    pub fn new(inner: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }
    /// Create new instance with the staging buffer `capacity`
    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        AsyncStreamTarget { inner, staging: Vec::with_capacity(capacity), capacity }
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
    pub async fn into_inner(mut self) -> IoResult<W> {
        self.drain().await?;
        self.inner.flush().await?;
        Ok(self.inner)
    }

    async fn drain(&mut self) -> IoResult<()> {
        if !self.staging.is_empty() {
            trace!(len = self.staging.len(), "draining staged bytes");
            self.inner.write_all(&self.staging).await?;
            self.staging.clear();
        }
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin> WriteTarget for AsyncStreamTarget<W> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        if self.staging.len() + buf.len() > self.capacity {
            self.drain().await?;
        }
        if buf.len() >= self.capacity {
            self.inner.write_all(buf).await?;
        }
        else {
            self.staging.extend_from_slice(buf);
        }
        Ok(())
    }

    async fn flush(&mut self) -> IoResult<()> {
        self.drain().await?;
        self.inner.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;
    use super::*;

    #[tokio::test]
    async fn test_async_stream_source_crosses_buffer() {
        let data: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let (mut tx, rx) = tokio::io::duplex(64);
        let payload = data.clone();
        let writer = tokio::spawn(async move {
            tx.write_all(&payload).await.unwrap();
        });
        let mut source = AsyncStreamSource::new(rx);
        assert_eq!(source.peek(1).await.unwrap(), &data[..1]);
        let all = source.peek(3000).await.unwrap();
        assert_eq!(all, &data[..]);
        source.advance(2990).unwrap();
        source.discard(10).await.unwrap();
        writer.await.unwrap();
        assert_eq!(source.peek(1).await.unwrap(), &[]);
        assert_eq!(source.discard(1).await, Err(IoError::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_async_stream_target() {
        let mut target = AsyncStreamTarget::with_capacity(4, Vec::new());
        target.write(b"ab").await.unwrap();
        target.write_byte(b'c').await.unwrap();
        assert_eq!(target.staged(), 3);
        target.write(b"defgh").await.unwrap();
        assert_eq!(target.get_ref(), b"abcdefgh");
        target.write_str("ij").await.unwrap();
        assert_eq!(target.into_inner().await.unwrap(), b"abcdefghij");
    }
}
