/// Implementation for foreign types
#[cfg(feature = "alloc")]
use alloc::{vec::Vec, collections::VecDeque};
#[cfg(feature = "std")]
use std::io::Cursor;

#[allow(unused_imports)]
use super::*;

#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl WriteTarget for Vec<u8> {
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl WriteTarget for VecDeque<u8> {
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend(buf.iter().copied());
        Ok(())
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.push_back(byte);
        Ok(())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> WriteTarget for Cursor<T>
    where Cursor<T>: std::io::Write
{
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        std::io::Write::write_all(self, buf).map_err(|_| IoError::BufferFull)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> WriteTarget for arrayvec::ArrayVec<u8, CAP> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.try_extend_from_slice(buf).map_err(|_| IoError::BufferFull)
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.try_push(byte).map_err(|_| IoError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> WriteTarget for heapless::Vec<u8, CAP> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend_from_slice(buf).map_err(|_| IoError::BufferFull)
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.push(byte).map_err(|_| IoError::BufferFull)
    }
}

#[cfg(feature = "smallvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "smallvec")))]
impl<A: smallvec::Array<Item = u8>> WriteTarget for smallvec::SmallVec<A> {
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "tinyvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "tinyvec")))]
impl<A: tinyvec::Array<Item = u8>> WriteTarget for tinyvec::ArrayVec<A> {
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        if buf.len() > self.capacity() - self.len() {
            return Err(IoError::BufferFull)
        }
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        match self.try_push(byte) {
            None => Ok(()),
            Some(_) => Err(IoError::BufferFull)
        }
    }
}

#[cfg(all(feature = "tinyvec", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "tinyvec", any(feature = "std", feature = "alloc")))))]
impl<A: tinyvec::Array<Item = u8>> WriteTarget for tinyvec::TinyVec<A> {
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    async fn write_byte(&mut self, byte: u8) -> IoResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "bytes")]
#[cfg_attr(docsrs, doc(cfg(feature = "bytes")))]
impl WriteTarget for bytes::BytesMut {
    #[inline]
    async fn write(&mut self, buf: &[u8]) -> IoResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use futures::FutureExt;
    #[allow(unused_imports)]
    use super::*;

    #[allow(dead_code)]
    fn fill<W: WriteTarget>(writer: &mut W) -> IoResult<()> {
        async {
            writer.write(b"Hello World!").await?;
            writer.write_byte(b' ').await?;
            writer.write_str("Good Bye!").await
        }.now_or_never().unwrap()
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_write_target_vec() {
        let mut writer = Vec::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(&writer, expected);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_write_target_vec_deque() {
        let mut writer = VecDeque::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(&writer, expected);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_write_target_cursor() {
        let mut writer = Cursor::new([0u8;22]);
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.get_ref(), expected);
        assert_eq!(writer.write_byte(b' ').now_or_never(), Some(Err(IoError::BufferFull)));
    }

    #[cfg(feature = "arrayvec")]
    #[test]
    fn test_write_target_arrayvec() {
        let mut writer = arrayvec::ArrayVec::<u8,22>::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.as_slice(), expected);
        assert_eq!(writer.write_byte(b' ').now_or_never(), Some(Err(IoError::BufferFull)));
    }

    #[cfg(feature = "heapless")]
    #[test]
    fn test_write_target_heapless() {
        let mut writer = heapless::Vec::<u8,22>::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.as_slice(), expected);
        assert_eq!(writer.write_byte(b' ').now_or_never(), Some(Err(IoError::BufferFull)));
    }

    #[cfg(feature = "smallvec")]
    #[test]
    fn test_write_target_smallvec() {
        let mut writer = smallvec::SmallVec::<[u8;8]>::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.as_slice(), expected);
        assert!(writer.spilled());
    }

    #[cfg(feature = "tinyvec")]
    #[test]
    fn test_write_target_tinyvec() {
        let mut writer = tinyvec::ArrayVec::<[u8;22]>::new();
        fill(&mut writer).unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.as_slice(), expected);
        assert_eq!(writer.write_byte(b' ').now_or_never(), Some(Err(IoError::BufferFull)));
        assert_eq!(writer.write(b"").now_or_never(), Some(Ok(())));
    }

    #[cfg(feature = "bytes")]
    #[test]
    fn test_write_target_bytes() {
        let mut writer = bytes::BytesMut::new();
        fill(&mut writer).unwrap();
        assert_eq!(&writer[..], b"Hello World! Good Bye!");
    }
}
