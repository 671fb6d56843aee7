//! MessagePack writer and the encoding entry points.
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use tracing::debug;
use msgpack_io::{WriteTarget, SliceWriter};

use crate::{Error, Result, Timestamp, SerializerOptions};
use crate::convert::{Converter, DefaultConverter};
use crate::magick::*;

/// Encode `value` with its default converter and return the encoded bytes
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
    where T: DefaultConverter
{
    to_vec_with::<T, T::Converter>(value, &SerializerOptions::DEFAULT)
}

/// Encode `value` with the converter `C` and return the encoded bytes
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
pub fn to_vec_with<T, C>(value: &T, options: &SerializerOptions) -> Result<Vec<u8>>
    where C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), "encoding to vec");
    let mut writer = Writer::new(Vec::new());
    crate::complete(C::write(&mut writer, value, options))?;
    Ok(writer.into_inner())
}

/// Encode `value` with its default converter into `buf`.
///
/// Return the number of bytes written or `Err(Error::Io(IoError::BufferFull))`.
pub fn to_slice<T>(buf: &mut [u8], value: &T) -> Result<usize>
    where T: DefaultConverter
{
    to_slice_with::<T, T::Converter>(buf, value, &SerializerOptions::DEFAULT)
}

/// Encode `value` with the converter `C` into `buf`
pub fn to_slice_with<T, C>(buf: &mut [u8], value: &T, options: &SerializerOptions) -> Result<usize>
    where C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), capacity = buf.len(), "encoding to slice");
    let mut writer = Writer::new(SliceWriter::new(buf));
    crate::complete(C::write(&mut writer, value, options))?;
    Ok(writer.get_ref().len())
}

/// Encode `value` with its default converter to a blocking stream.
///
/// The stream is flushed on success. Pass it as `&mut` to keep it.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn to_writer<W, T>(stream: W, value: &T) -> Result<()>
    where W: std::io::Write, T: DefaultConverter
{
    to_writer_with::<W, T, T::Converter>(stream, value, &SerializerOptions::DEFAULT)
}

/// Encode `value` with the converter `C` to a blocking stream
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn to_writer_with<W, T, C>(stream: W, value: &T, options: &SerializerOptions) -> Result<()>
    where W: std::io::Write, C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), "encoding to stream");
    let mut writer = Writer::new(msgpack_io::StreamTarget::new(stream));
    crate::complete(async {
        C::write(&mut writer, value, options).await?;
        writer.flush().await
    })
}

/// Encode `value` with its default converter to an async stream.
///
/// The stream is flushed on success.
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub async fn to_async_writer<W, T>(stream: W, value: &T) -> Result<()>
    where W: tokio::io::AsyncWrite + Unpin, T: DefaultConverter
{
    to_async_writer_with::<W, T, T::Converter>(stream, value, &SerializerOptions::DEFAULT).await
}

/// Encode `value` with the converter `C` to an async stream
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub async fn to_async_writer_with<W, T, C>(stream: W, value: &T, options: &SerializerOptions) -> Result<()>
    where W: tokio::io::AsyncWrite + Unpin, C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), "encoding to async stream");
    let mut writer = Writer::new(msgpack_io::AsyncStreamTarget::new(stream));
    C::write(&mut writer, value, options).await?;
    writer.flush().await
}

/// MessagePack encoder over a [`WriteTarget`].
///
/// Every method writes exactly one complete value, or a header which must be
/// followed by the announced number of values.
#[derive(Debug)]
pub struct Writer<W> {
    target: W
}

impl<W: WriteTarget> Writer<W> {
    /// Create new instance
    pub fn new(target: W) -> Self {
        Writer { target }
    }
    /// Return a reference to the underlying target
    pub fn get_ref(&self) -> &W {
        &self.target
    }
    /// Return a mutable reference to the underlying target
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.target
    }
    /// Destruct into the underlying target
    pub fn into_inner(self) -> W {
        self.target
    }

    /// Push the staged bytes down to the underlying stream
    pub async fn flush(&mut self) -> Result<()> {
        Ok(self.target.flush().await?)
    }

    /// Write a tag with its fixed-size payload in one go
    async fn write_tagged(&mut self, tag: u8, payload: &[u8]) -> Result<()> {
        let mut buf = [0u8; 24];
        let end = payload.len() + 1;
        buf[0] = tag;
        buf[1..end].copy_from_slice(payload);
        self.target.write(&buf[..end]).await?;
        Ok(())
    }

    pub async fn write_nil(&mut self) -> Result<()> {
        Ok(self.target.write_byte(NIL).await?)
    }

    pub async fn write_bool(&mut self, v: bool) -> Result<()> {
        Ok(self.target.write_byte(if v { TRUE } else { FALSE }).await?)
    }

    /// Write an unsigned integer in its smallest representation
    pub async fn write_u64(&mut self, v: u64) -> Result<()> {
        if v <= MAX_POSFIXINT as u64 {
            self.target.write_byte(v as u8).await?;
            Ok(())
        }
        else if let Ok(v) = u8::try_from(v) {
            self.write_tagged(UINT_8, &[v]).await
        }
        else if let Ok(v) = u16::try_from(v) {
            self.write_tagged(UINT_16, &v.to_be_bytes()).await
        }
        else if let Ok(v) = u32::try_from(v) {
            self.write_tagged(UINT_32, &v.to_be_bytes()).await
        }
        else {
            self.write_tagged(UINT_64, &v.to_be_bytes()).await
        }
    }

    /// Write a signed integer in its smallest representation.
    ///
    /// Non-negative values are written as unsigned integers.
    pub async fn write_i64(&mut self, v: i64) -> Result<()> {
        if v >= 0 {
            return self.write_u64(v as u64).await
        }
        if v >= MIN_NEGFIXINT as i64 {
            self.target.write_byte(v as u8).await?;
            Ok(())
        }
        else if let Ok(v) = i8::try_from(v) {
            self.write_tagged(INT_8, &v.to_be_bytes()).await
        }
        else if let Ok(v) = i16::try_from(v) {
            self.write_tagged(INT_16, &v.to_be_bytes()).await
        }
        else if let Ok(v) = i32::try_from(v) {
            self.write_tagged(INT_32, &v.to_be_bytes()).await
        }
        else {
            self.write_tagged(INT_64, &v.to_be_bytes()).await
        }
    }

    pub async fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_u64(v.into()).await
    }

    pub async fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_u64(v.into()).await
    }

    pub async fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_u64(v.into()).await
    }

    pub async fn write_i8(&mut self, v: i8) -> Result<()> {
        self.write_i64(v.into()).await
    }

    pub async fn write_i16(&mut self, v: i16) -> Result<()> {
        self.write_i64(v.into()).await
    }

    pub async fn write_i32(&mut self, v: i32) -> Result<()> {
        self.write_i64(v.into()).await
    }

    pub async fn write_f32(&mut self, v: f32) -> Result<()> {
        self.write_tagged(FLOAT_32, &v.to_be_bytes()).await
    }

    pub async fn write_f64(&mut self, v: f64) -> Result<()> {
        self.write_tagged(FLOAT_64, &v.to_be_bytes()).await
    }

    /// Write a string header announcing `len` bytes
    pub async fn write_str_len(&mut self, len: usize) -> Result<()> {
        if len <= MAX_FIXSTR_SIZE {
            self.target.write_byte(FIXSTR | (len as u8)).await?;
            Ok(())
        }
        else if let Ok(len) = u8::try_from(len) {
            self.write_tagged(STR_8, &[len]).await
        }
        else if let Ok(len) = u16::try_from(len) {
            self.write_tagged(STR_16, &len.to_be_bytes()).await
        }
        else if let Ok(len) = u32::try_from(len) {
            self.write_tagged(STR_32, &len.to_be_bytes()).await
        }
        else {
            Err(Error::LengthLimit { declared: len as u64, limit: u32::MAX as usize })
        }
    }

    pub async fn write_str(&mut self, v: &str) -> Result<()> {
        self.write_str_utf8(v.as_bytes()).await
    }

    /// Write bytes, which must be valid UTF-8, as a string
    pub async fn write_str_utf8(&mut self, v: &[u8]) -> Result<()> {
        self.write_str_len(v.len()).await?;
        Ok(self.target.write(v).await?)
    }

    /// Write a binary header announcing `len` bytes
    pub async fn write_bin_len(&mut self, len: usize) -> Result<()> {
        if let Ok(len) = u8::try_from(len) {
            self.write_tagged(BIN_8, &[len]).await
        }
        else if let Ok(len) = u16::try_from(len) {
            self.write_tagged(BIN_16, &len.to_be_bytes()).await
        }
        else if let Ok(len) = u32::try_from(len) {
            self.write_tagged(BIN_32, &len.to_be_bytes()).await
        }
        else {
            Err(Error::LengthLimit { declared: len as u64, limit: u32::MAX as usize })
        }
    }

    pub async fn write_bin(&mut self, v: &[u8]) -> Result<()> {
        self.write_bin_len(v.len()).await?;
        Ok(self.target.write(v).await?)
    }

    /// Write an array header; `len` values must follow
    pub async fn write_array_len(&mut self, len: usize) -> Result<()> {
        if len <= MAX_FIXARRAY_SIZE {
            self.target.write_byte(FIXARRAY | (len as u8)).await?;
            Ok(())
        }
        else if let Ok(len) = u16::try_from(len) {
            self.write_tagged(ARRAY_16, &len.to_be_bytes()).await
        }
        else if let Ok(len) = u32::try_from(len) {
            self.write_tagged(ARRAY_32, &len.to_be_bytes()).await
        }
        else {
            Err(Error::LengthLimit { declared: len as u64, limit: u32::MAX as usize })
        }
    }

    /// Write a map header; `len` key-value pairs must follow
    pub async fn write_map_len(&mut self, len: usize) -> Result<()> {
        if len <= MAX_FIXMAP_SIZE {
            self.target.write_byte(FIXMAP | (len as u8)).await?;
            Ok(())
        }
        else if let Ok(len) = u16::try_from(len) {
            self.write_tagged(MAP_16, &len.to_be_bytes()).await
        }
        else if let Ok(len) = u32::try_from(len) {
            self.write_tagged(MAP_32, &len.to_be_bytes()).await
        }
        else {
            Err(Error::LengthLimit { declared: len as u64, limit: u32::MAX as usize })
        }
    }

    /// Write an extension value of type `typ`
    pub async fn write_ext(&mut self, typ: i8, data: &[u8]) -> Result<()> {
        let typ = typ as u8;
        match data.len() {
            1 => self.write_tagged(FIXEXT_1, &[typ]).await?,
            2 => self.write_tagged(FIXEXT_2, &[typ]).await?,
            4 => self.write_tagged(FIXEXT_4, &[typ]).await?,
            8 => self.write_tagged(FIXEXT_8, &[typ]).await?,
            16 => self.write_tagged(FIXEXT_16, &[typ]).await?,
            len => {
                if let Ok(len) = u8::try_from(len) {
                    self.write_tagged(EXT_8, &[len, typ]).await?
                }
                else if let Ok(len) = u16::try_from(len) {
                    let [a, b] = len.to_be_bytes();
                    self.write_tagged(EXT_16, &[a, b, typ]).await?
                }
                else if let Ok(len) = u32::try_from(len) {
                    let [a, b, c, d] = len.to_be_bytes();
                    self.write_tagged(EXT_32, &[a, b, c, d, typ]).await?
                }
                else {
                    return Err(Error::LengthLimit { declared: len as u64, limit: u32::MAX as usize })
                }
            }
        }
        Ok(self.target.write(data).await?)
    }

    /// Write a timestamp extension in its smallest layout
    pub async fn write_timestamp(&mut self, ts: Timestamp) -> Result<()> {
        let seconds = ts.seconds();
        let nanos = ts.nanos();
        if (seconds as u64) >> 34 == 0 {
            let data64 = ((nanos as u64) << 34) | seconds as u64;
            if data64 & 0xffff_ffff_0000_0000 == 0 {
                let [a, b, c, d] = (data64 as u32).to_be_bytes();
                self.write_tagged(FIXEXT_4, &[EXT_TIMESTAMP as u8, a, b, c, d]).await
            }
            else {
                let mut buf = [0u8; 9];
                buf[0] = EXT_TIMESTAMP as u8;
                buf[1..].copy_from_slice(&data64.to_be_bytes());
                self.write_tagged(FIXEXT_8, &buf).await
            }
        }
        else {
            let mut buf = [0u8; 14];
            buf[0] = TIMESTAMP_96_LEN;
            buf[1] = EXT_TIMESTAMP as u8;
            buf[2..6].copy_from_slice(&nanos.to_be_bytes());
            buf[6..].copy_from_slice(&seconds.to_be_bytes());
            self.write_tagged(EXT_8, &buf).await
        }
    }

    /// Write 16 bytes as a binary value
    pub async fn write_bin16(&mut self, v: [u8; 16]) -> Result<()> {
        let mut buf = [0u8; 17];
        buf[0] = BIN16_LEN;
        buf[1..].copy_from_slice(&v);
        self.write_tagged(BIN_8, &buf).await
    }

    /// Write a 128-bit integer as 16 big-endian bytes
    pub async fn write_u128_as_bytes(&mut self, v: u128) -> Result<()> {
        self.write_bin16(v.to_be_bytes()).await
    }

    /// Write a 128-bit integer as 16 big-endian bytes
    pub async fn write_i128_as_bytes(&mut self, v: i128) -> Result<()> {
        self.write_bin16(v.to_be_bytes()).await
    }

    #[cfg(feature = "uuid")]
    #[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
    pub async fn write_uuid(&mut self, v: &uuid::Uuid) -> Result<()> {
        self.write_bin16(*v.as_bytes()).await
    }

    /// Write a decimal as 16 bytes: flags, high, middle and low words, big-endian
    #[cfg(feature = "rust_decimal")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rust_decimal")))]
    pub async fn write_decimal(&mut self, v: &rust_decimal::Decimal) -> Result<()> {
        // flags | lo | mid | hi, each little-endian
        let raw = v.serialize();
        let mut buf = [0u8; 16];
        for (word, at) in [(0, 0), (3, 4), (2, 8), (1, 12)] {
            let mut le = [0u8; 4];
            le.copy_from_slice(&raw[word * 4..word * 4 + 4]);
            buf[at..at + 4].copy_from_slice(&u32::from_le_bytes(le).to_be_bytes());
        }
        self.write_bin16(buf).await
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use alloc::{vec, vec::Vec, string::String};
    use futures::FutureExt;
    use super::*;

    fn encode<F>(f: F) -> Vec<u8>
        where F: for<'a> AsyncFnOnce(&'a mut Writer<Vec<u8>>) -> Result<()>
    {
        let mut writer = Writer::new(Vec::new());
        f(&mut writer).now_or_never().unwrap().unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_write_integers() {
        macro_rules! test_ints {
            ($($v:expr => [$($byte:expr),*]),* $(,)?) => {$(
                let v: i64 = $v;
                assert_eq!(encode(async |w| w.write_i64(v).await), vec![$($byte),*], "{}", v);
            )*};
        }
        test_ints! {
            0 => [0x00],
            127 => [0x7f],
            128 => [0xcc, 0x80],
            255 => [0xcc, 0xff],
            256 => [0xcd, 0x01, 0x00],
            65535 => [0xcd, 0xff, 0xff],
            65536 => [0xce, 0x00, 0x01, 0x00, 0x00],
            123456 => [0xce, 0x00, 0x01, 0xe2, 0x40],
            4294967295 => [0xce, 0xff, 0xff, 0xff, 0xff],
            4294967296 => [0xcf, 0, 0, 0, 1, 0, 0, 0, 0],
            -1 => [0xff],
            -32 => [0xe0],
            -33 => [0xd0, 0xdf],
            -128 => [0xd0, 0x80],
            -129 => [0xd1, 0xff, 0x7f],
            -32768 => [0xd1, 0x80, 0x00],
            -32769 => [0xd2, 0xff, 0xff, 0x7f, 0xff],
            -123456 => [0xd2, 0xff, 0xfe, 0x1d, 0xc0],
            -2147483649 => [0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff],
            i64::MIN => [0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0],
        }
        assert_eq!(encode(async |w| w.write_u64(u64::MAX).await),
                   [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(encode(async |w| w.write_u8(200).await), [0xcc, 200]);
        assert_eq!(encode(async |w| w.write_i8(-100).await), [0xd0, 0x9c]);
    }

    #[test]
    fn test_write_floats() {
        assert_eq!(encode(async |w| w.write_f64(123.456).await),
                   [0xcb, 0x40, 0x5e, 0xdd, 0x2f, 0x1a, 0x9f, 0xbe, 0x77]);
        assert_eq!(encode(async |w| w.write_f32(456.0).await),
                   [0xca, 0x43, 0xe4, 0x00, 0x00]);
    }

    #[test]
    fn test_write_str_bin_heads() {
        let s31 = String::from_utf8(vec![b'x'; 31]).unwrap();
        let bytes = encode(async |w| w.write_str(&s31).await);
        assert_eq!(bytes[0], 0xbf);
        assert_eq!(bytes.len(), 32);
        let s32 = String::from_utf8(vec![b'x'; 32]).unwrap();
        assert_eq!(encode(async |w| w.write_str(&s32).await)[..2], [0xd9, 32]);
        let s256 = String::from_utf8(vec![b'x'; 256]).unwrap();
        assert_eq!(encode(async |w| w.write_str(&s256).await)[..3], [0xda, 1, 0]);
        assert_eq!(encode(async |w| w.write_str_len(65536).await), [0xdb, 0, 1, 0, 0]);
        assert_eq!(encode(async |w| w.write_str("").await), [0xa0]);
        assert_eq!(encode(async |w| w.write_bin(b"").await), [0xc4, 0]);
        assert_eq!(encode(async |w| w.write_bin(b"ab").await), [0xc4, 2, b'a', b'b']);
        assert_eq!(encode(async |w| w.write_bin_len(256).await), [0xc5, 1, 0]);
        assert_eq!(encode(async |w| w.write_bin_len(65536).await), [0xc6, 0, 1, 0, 0]);
    }

    #[test]
    fn test_write_collection_heads() {
        assert_eq!(encode(async |w| w.write_array_len(0).await), [0x90]);
        assert_eq!(encode(async |w| w.write_array_len(15).await), [0x9f]);
        assert_eq!(encode(async |w| w.write_array_len(16).await), [0xdc, 0, 16]);
        assert_eq!(encode(async |w| w.write_array_len(65536).await), [0xdd, 0, 1, 0, 0]);
        assert_eq!(encode(async |w| w.write_map_len(15).await), [0x8f]);
        assert_eq!(encode(async |w| w.write_map_len(16).await), [0xde, 0, 16]);
        assert_eq!(encode(async |w| w.write_map_len(70000).await), [0xdf, 0, 1, 0x11, 0x70]);
    }

    #[test]
    fn test_write_timestamp() {
        let ts = |s, n| Timestamp::new(s, n).unwrap();
        assert_eq!(encode(async |w| w.write_timestamp(ts(0, 0)).await),
                   [0xd6, 0xff, 0, 0, 0, 0]);
        assert_eq!(encode(async |w| w.write_timestamp(ts(u32::MAX as i64, 0)).await),
                   [0xd6, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(encode(async |w| w.write_timestamp(ts(1, 1)).await),
                   [0xd7, 0xff, 0, 0, 0, 0b100, 0, 0, 0, 1]);
        assert_eq!(encode(async |w| w.write_timestamp(ts(1 << 32, 0)).await),
                   [0xd7, 0xff, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(encode(async |w| w.write_timestamp(ts(1 << 34, 5)).await),
                   [0xc7, 12, 0xff, 0, 0, 0, 5, 0, 0, 0, 4, 0, 0, 0, 0]);
        assert_eq!(encode(async |w| w.write_timestamp(ts(-1, 0)).await),
                   [0xc7, 12, 0xff, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_write_ext_and_bin16() {
        assert_eq!(encode(async |w| w.write_ext(5, &[1]).await), [0xd4, 5, 1]);
        assert_eq!(encode(async |w| w.write_ext(-2, &[1, 2, 3]).await), [0xc7, 3, 0xfe, 1, 2, 3]);
        assert_eq!(encode(async |w| w.write_u128_as_bytes(1).await),
                   [0xc4, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode(async |w| w.write_i128_as_bytes(-1).await)[..4], [0xc4, 16, 0xff, 0xff]);
    }

    #[test]
    fn test_write_to_full_slice() {
        let mut buf = [0u8; 2];
        let mut writer = Writer::new(SliceWriter::new(&mut buf));
        assert_eq!(writer.write_u32(123456).now_or_never().unwrap(),
                   Err(Error::Io(msgpack_io::IoError::BufferFull)));
        writer.write_u8(200).now_or_never().unwrap().unwrap();
        assert_eq!(writer.get_ref().as_ref(), [0xcc, 200]);
    }
}
