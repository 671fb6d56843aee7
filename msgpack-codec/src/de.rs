//! MessagePack reader and the decoding entry points.
#[cfg(feature = "alloc")]
use alloc::{vec::Vec, string::String};
use core::str;

use tracing::debug;
use msgpack_io::{ReadSource, SliceReader, IoError};

use crate::{Error, Result, MessagePackType, DecodedInteger, DecodedFloat, Timestamp, SerializerOptions};
use crate::convert::{Converter, DefaultConverter};
use crate::magick::*;
use crate::value::NANOS_PER_SEC;

/// Decode a value of type `T` with its default converter from a slice.
///
/// Return a tuple with `(value, msgpack_len)`. `msgpack_len` <= `input.len()`.
pub fn from_slice<T>(input: &[u8]) -> Result<(T, usize)>
    where T: DefaultConverter
{
    from_slice_with::<T, T::Converter>(input, &SerializerOptions::DEFAULT)
}

/// Decode a value of type `T` with the converter `C` from a slice
pub fn from_slice_with<T, C>(input: &[u8], options: &SerializerOptions) -> Result<(T, usize)>
    where C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), len = input.len(), "decoding from slice");
    let mut reader = Reader::new(SliceReader::new(input)).with_max_length(options.max_length);
    let value = crate::complete(C::read(&mut reader, options))?;
    Ok((value, reader.get_ref().position()))
}

/// Decode a value of type `T` with its default converter from a blocking stream.
///
/// Bytes read ahead past the decoded value are dropped with the internal
/// buffer. Pass the stream as `&mut` to keep it.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn from_reader<R, T>(stream: R) -> Result<T>
    where R: std::io::Read, T: DefaultConverter
{
    from_reader_with::<R, T, T::Converter>(stream, &SerializerOptions::DEFAULT)
}

/// Decode a value of type `T` with the converter `C` from a blocking stream
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn from_reader_with<R, T, C>(stream: R, options: &SerializerOptions) -> Result<T>
    where R: std::io::Read, C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), "decoding from stream");
    let mut reader = Reader::new(msgpack_io::StreamSource::new(stream))
                     .with_max_length(options.max_length);
    crate::complete(C::read(&mut reader, options))
}

/// Decode a value of type `T` with its default converter from an async stream
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub async fn from_async_reader<R, T>(stream: R) -> Result<T>
    where R: tokio::io::AsyncRead + Unpin, T: DefaultConverter
{
    from_async_reader_with::<R, T, T::Converter>(stream, &SerializerOptions::DEFAULT).await
}

/// Decode a value of type `T` with the converter `C` from an async stream
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub async fn from_async_reader_with<R, T, C>(stream: R, options: &SerializerOptions) -> Result<T>
    where R: tokio::io::AsyncRead + Unpin, C: Converter<T>
{
    debug!(ty = core::any::type_name::<T>(), "decoding from async stream");
    let mut reader = Reader::new(msgpack_io::AsyncStreamSource::new(stream))
                     .with_max_length(options.max_length);
    C::read(&mut reader, options).await
}

/// MessagePack decoder over a [`ReadSource`].
///
/// Methods decoding a value return `Ok(None)` without consuming anything
/// when the next value is of another type, and an error when the value is
/// malformed or truncated.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    max_length: usize
}

impl<S: ReadSource> Reader<S> {
    /// Create new instance with the default length limit
    pub fn new(source: S) -> Self {
        Reader { source, max_length: crate::options::DEFAULT_MAX_LENGTH }
    }
    /// Set the largest accepted declared length of a string, binary or extension
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
    pub fn max_length(&self) -> usize {
        self.max_length
    }
    /// Return a reference to the underlying source
    pub fn get_ref(&self) -> &S {
        &self.source
    }
    /// Return a mutable reference to the underlying source
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }
    /// Destruct into the underlying source
    pub fn into_inner(self) -> S {
        self.source
    }

    async fn peek_tag(&mut self) -> Result<Option<u8>> {
        Ok(self.source.peek(1).await?.first().copied())
    }

    /// Peek exactly `len` bytes
    async fn fetch_peek(&mut self, len: usize) -> Result<&[u8]> {
        let bytes = self.source.peek(len).await?;
        if bytes.len() < len {
            return Err(Error::UnexpectedEof)
        }
        Ok(bytes)
    }

    /// Copy `N` bytes found at `offset` without consuming them
    async fn fetch_array<const N: usize>(&mut self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.fetch_peek(offset + N).await?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes[offset..offset + N]);
        Ok(out)
    }

    async fn fetch_u8(&mut self, offset: usize) -> Result<u8> {
        let [v] = self.fetch_array(offset).await?;
        Ok(v)
    }

    async fn fetch_u16(&mut self, offset: usize) -> Result<u16> {
        Ok(u16::from_be_bytes(self.fetch_array(offset).await?))
    }

    async fn fetch_u32(&mut self, offset: usize) -> Result<u32> {
        Ok(u32::from_be_bytes(self.fetch_array(offset).await?))
    }

    fn check_length(&self, len: u64) -> Result<usize> {
        match usize::try_from(len) {
            Ok(n) if n <= self.max_length => Ok(n),
            _ => {
                debug!(declared = len, limit = self.max_length, "declared length over the limit");
                Err(Error::LengthLimit { declared: len, limit: self.max_length })
            }
        }
    }

    /// Return the type of the next value without consuming it
    pub async fn peek_type(&mut self) -> Result<MessagePackType> {
        Ok(match self.peek_tag().await? {
            Some(tag) => MessagePackType::from_tag(tag),
            None => MessagePackType::Eof
        })
    }

    /// Build the error reported when the next value is not of the `expected` type
    pub async fn unexpected<T>(&mut self, expected: MessagePackType) -> Result<T> {
        match self.peek_tag().await? {
            None => Err(Error::UnexpectedEof),
            Some(RESERVED) => Err(Error::ReservedCode),
            Some(tag) => Err(Error::UnexpectedType { expected, found: MessagePackType::from_tag(tag) })
        }
    }

    /// Consume a nil and return `true`, or return `false` if the next value is not nil
    pub async fn read_nil(&mut self) -> Result<bool> {
        if self.peek_tag().await? == Some(NIL) {
            self.source.advance(1)?;
            return Ok(true)
        }
        Ok(false)
    }

    pub async fn read_bool(&mut self) -> Result<Option<bool>> {
        let v = match self.peek_tag().await? {
            Some(TRUE) => true,
            Some(FALSE) => false,
            _ => return Ok(None)
        };
        self.source.advance(1)?;
        Ok(Some(v))
    }

    /// Decode an integer of any width
    pub async fn read_integer(&mut self) -> Result<DecodedInteger> {
        let Some(tag) = self.peek_tag().await? else {
            return Ok(DecodedInteger::None)
        };
        let (v, len) = match tag {
            MIN_POSFIXINT..=MAX_POSFIXINT => (DecodedInteger::U8(tag), 1),
            NEGFIXINT..=0xff => (DecodedInteger::I8(tag as i8), 1),
            UINT_8 => (DecodedInteger::U8(self.fetch_u8(1).await?), 2),
            UINT_16 => (DecodedInteger::U16(self.fetch_u16(1).await?), 3),
            UINT_32 => (DecodedInteger::U32(self.fetch_u32(1).await?), 5),
            UINT_64 => (DecodedInteger::U64(u64::from_be_bytes(self.fetch_array(1).await?)), 9),
            INT_8 => (DecodedInteger::I8(i8::from_be_bytes(self.fetch_array(1).await?)), 2),
            INT_16 => (DecodedInteger::I16(i16::from_be_bytes(self.fetch_array(1).await?)), 3),
            INT_32 => (DecodedInteger::I32(i32::from_be_bytes(self.fetch_array(1).await?)), 5),
            INT_64 => (DecodedInteger::I64(i64::from_be_bytes(self.fetch_array(1).await?)), 9),
            _ => return Ok(DecodedInteger::None)
        };
        self.source.advance(len)?;
        Ok(v)
    }

    /// Decode an integer that must fit the target type.
    ///
    /// Return `Ok(None)` if the next value is not an integer and
    /// `Err(Error::IntegerOverflow)` if it does not fit.
    async fn read_checked<T>(&mut self, checked: fn(DecodedInteger) -> Option<T>) -> Result<Option<T>> {
        match self.read_integer().await? {
            DecodedInteger::None => Ok(None),
            v => checked(v).map(Some).ok_or(Error::IntegerOverflow)
        }
    }

    /// Decode a float; integers are not coerced
    pub async fn read_float(&mut self) -> Result<DecodedFloat> {
        let v = match self.peek_tag().await? {
            Some(FLOAT_32) => DecodedFloat::F32(f32::from_be_bytes(self.fetch_array(1).await?)),
            Some(FLOAT_64) => DecodedFloat::F64(f64::from_be_bytes(self.fetch_array(1).await?)),
            _ => return Ok(DecodedFloat::None)
        };
        self.source.advance(if let DecodedFloat::F32(_) = v { 5 } else { 9 })?;
        Ok(v)
    }

    pub async fn read_f32(&mut self) -> Result<Option<f32>> {
        Ok(self.read_float().await?.try_to_f32())
    }

    pub async fn read_f64(&mut self) -> Result<Option<f64>> {
        Ok(self.read_float().await?.try_to_f64())
    }

    /// Return `(payload length, header length)` of the next string
    async fn str_head(&mut self) -> Result<Option<(usize, usize)>> {
        let Some(tag) = self.peek_tag().await? else {
            return Ok(None)
        };
        let (len, head) = match tag {
            FIXSTR..=FIXSTR_MAX => (u64::from(tag) & MAX_FIXSTR_SIZE as u64, 1),
            STR_8 => (self.fetch_u8(1).await?.into(), 2),
            STR_16 => (self.fetch_u16(1).await?.into(), 3),
            STR_32 => (self.fetch_u32(1).await?.into(), 5),
            _ => return Ok(None)
        };
        Ok(Some((self.check_length(len)?, head)))
    }

    /// Return `(payload length, header length)` of the next binary
    async fn bin_head(&mut self) -> Result<Option<(usize, usize)>> {
        let (len, head) = match self.peek_tag().await? {
            Some(BIN_8) => (self.fetch_u8(1).await?.into(), 2),
            Some(BIN_16) => (self.fetch_u16(1).await?.into(), 3),
            Some(BIN_32) => (self.fetch_u32(1).await?.into(), 5),
            _ => return Ok(None)
        };
        Ok(Some((self.check_length(len)?, head)))
    }

    /// Return the byte length of the next string without consuming it
    pub async fn peek_str_len(&mut self) -> Result<Option<usize>> {
        Ok(self.str_head().await?.map(|(len, _)| len))
    }

    /// Return the byte length of the next binary without consuming it
    pub async fn peek_bin_len(&mut self) -> Result<Option<usize>> {
        Ok(self.bin_head().await?.map(|(len, _)| len))
    }

    /// Consume the `head` and return the `len` payload bytes to `f`
    async fn read_payload_with<F, R>(&mut self, len: usize, head: usize, f: F) -> Result<R>
        where F: FnOnce(&[u8]) -> Result<R>
    {
        let total = head + len;
        let bytes = self.fetch_peek(total).await?;
        let res = f(&bytes[head..total])?;
        self.source.advance(total)?;
        Ok(res)
    }

    /// Pass the next string to `f`, the reference is valid only for the call
    pub async fn read_str_with<F, R>(&mut self, f: F) -> Result<Option<R>>
        where F: FnOnce(&str) -> R
    {
        let Some((len, head)) = self.str_head().await? else {
            return Ok(None)
        };
        self.read_payload_with(len, head, |bytes| Ok(f(str::from_utf8(bytes)?))).await.map(Some)
    }

    /// Pass the raw bytes of the next string to `f` without validating them
    pub async fn read_str_utf8_with<F, R>(&mut self, f: F) -> Result<Option<R>>
        where F: FnOnce(&[u8]) -> R
    {
        let Some((len, head)) = self.str_head().await? else {
            return Ok(None)
        };
        self.read_payload_with(len, head, |bytes| Ok(f(bytes))).await.map(Some)
    }

    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
    pub async fn read_string(&mut self) -> Result<Option<String>> {
        self.read_str_with(|s| String::from(s)).await
    }

    /// Copy the raw bytes of the next string into `buf` and return their count.
    ///
    /// If `buf` is too short, return `Err(Error::Io(IoError::BufferFull))`
    /// and consume nothing.
    pub async fn read_str_utf8_into(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let Some((len, head)) = self.str_head().await? else {
            return Ok(None)
        };
        let out = buf.get_mut(..len).ok_or(Error::Io(IoError::BufferFull))?;
        self.read_payload_with(len, head, |bytes| { out.copy_from_slice(bytes); Ok(len) }).await.map(Some)
    }

    /// Pass the next binary to `f`, the reference is valid only for the call
    pub async fn read_bin_with<F, R>(&mut self, f: F) -> Result<Option<R>>
        where F: FnOnce(&[u8]) -> R
    {
        let Some((len, head)) = self.bin_head().await? else {
            return Ok(None)
        };
        self.read_payload_with(len, head, |bytes| Ok(f(bytes))).await.map(Some)
    }

    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
    pub async fn read_bin(&mut self) -> Result<Option<Vec<u8>>> {
        self.read_bin_with(|bytes| bytes.to_vec()).await
    }

    /// Copy the next binary into `buf` and return its length.
    ///
    /// If `buf` is too short, return `Err(Error::Io(IoError::BufferFull))`
    /// and consume nothing.
    pub async fn read_bin_into(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let Some((len, head)) = self.bin_head().await? else {
            return Ok(None)
        };
        let out = buf.get_mut(..len).ok_or(Error::Io(IoError::BufferFull))?;
        self.read_payload_with(len, head, |bytes| { out.copy_from_slice(bytes); Ok(len) }).await.map(Some)
    }

    /// Consume an array header and return the number of elements that follow
    pub async fn read_array_len(&mut self) -> Result<Option<usize>> {
        let (len, head) = match self.peek_tag().await? {
            Some(tag@(FIXARRAY..=FIXARRAY_MAX)) => ((tag as usize) & MAX_FIXARRAY_SIZE, 1),
            Some(ARRAY_16) => (self.fetch_u16(1).await?.into(), 3),
            Some(ARRAY_32) => (self.fetch_u32(1).await? as usize, 5),
            _ => return Ok(None)
        };
        self.source.advance(head)?;
        Ok(Some(len))
    }

    /// Consume a map header and return the number of key-value pairs that follow
    pub async fn read_map_len(&mut self) -> Result<Option<usize>> {
        let (len, head) = match self.peek_tag().await? {
            Some(tag@(FIXMAP..=FIXMAP_MAX)) => ((tag as usize) & MAX_FIXMAP_SIZE, 1),
            Some(MAP_16) => (self.fetch_u16(1).await?.into(), 3),
            Some(MAP_32) => (self.fetch_u32(1).await? as usize, 5),
            _ => return Ok(None)
        };
        self.source.advance(head)?;
        Ok(Some(len))
    }

    /// Decode a timestamp extension in any of its three layouts
    pub async fn read_timestamp(&mut self) -> Result<Option<Timestamp>> {
        let (seconds, nanos, len) = match self.peek_tag().await? {
            Some(FIXEXT_4) => {
                let [typ, a, b, c, d] = self.fetch_array(1).await?;
                if typ as i8 != EXT_TIMESTAMP {
                    return Ok(None)
                }
                (i64::from(u32::from_be_bytes([a, b, c, d])), 0, 6)
            }
            Some(FIXEXT_8) => {
                let [typ] = self.fetch_array(1).await?;
                if typ as i8 != EXT_TIMESTAMP {
                    return Ok(None)
                }
                let data64 = u64::from_be_bytes(self.fetch_array(2).await?);
                ((data64 & 0x3_ffff_ffff) as i64, (data64 >> 34) as u32, 10)
            }
            Some(EXT_8) => {
                let [size, typ] = self.fetch_array(1).await?;
                if typ as i8 != EXT_TIMESTAMP {
                    return Ok(None)
                }
                if size != TIMESTAMP_96_LEN {
                    return Err(Error::InvalidTimestamp)
                }
                let nanos = u32::from_be_bytes(self.fetch_array(3).await?);
                let seconds = i64::from_be_bytes(self.fetch_array(7).await?);
                (seconds, nanos, 15)
            }
            _ => return Ok(None)
        };
        if nanos >= NANOS_PER_SEC {
            return Err(Error::InvalidTimestamp)
        }
        self.source.advance(len)?;
        Ok(Timestamp::new(seconds, nanos))
    }

    /// Decode a binary value of exactly 16 bytes
    pub async fn read_bin16(&mut self) -> Result<Option<[u8; 16]>> {
        if self.peek_tag().await? != Some(BIN_8) || self.fetch_u8(1).await? != BIN16_LEN {
            return Ok(None)
        }
        let v = self.fetch_array(2).await?;
        self.source.advance(18)?;
        Ok(Some(v))
    }

    pub async fn read_u128_from_bytes(&mut self) -> Result<Option<u128>> {
        Ok(self.read_bin16().await?.map(u128::from_be_bytes))
    }

    pub async fn read_i128_from_bytes(&mut self) -> Result<Option<i128>> {
        Ok(self.read_bin16().await?.map(i128::from_be_bytes))
    }

    #[cfg(feature = "uuid")]
    #[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
    pub async fn read_uuid(&mut self) -> Result<Option<uuid::Uuid>> {
        Ok(self.read_bin16().await?.map(uuid::Uuid::from_bytes))
    }

    #[cfg(feature = "rust_decimal")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rust_decimal")))]
    pub async fn read_decimal(&mut self) -> Result<Option<rust_decimal::Decimal>> {
        let Some(bytes) = self.read_bin16().await? else {
            return Ok(None)
        };
        let mut raw = [0u8; 16];
        for (word, at) in [(0, 0), (3, 4), (2, 8), (1, 12)] {
            let mut be = [0u8; 4];
            be.copy_from_slice(&bytes[at..at + 4]);
            raw[word * 4..word * 4 + 4].copy_from_slice(&u32::from_be_bytes(be).to_le_bytes());
        }
        let scale = u32::from(bytes[1]);
        if scale > rust_decimal::Decimal::MAX_SCALE {
            return Err(Error::InvalidValue("decimal scale"))
        }
        Ok(Some(rust_decimal::Decimal::deserialize(raw)))
    }

    /// Consume one complete value, including all nested values.
    ///
    /// Return `Ok(false)` only when there is no more input before the value.
    pub async fn skip_once(&mut self) -> Result<bool> {
        let mut pending: u64 = 1;
        let mut first = true;
        while pending != 0 {
            let Some(tag) = self.peek_tag().await? else {
                if first {
                    return Ok(false)
                }
                return Err(Error::UnexpectedEof)
            };
            first = false;
            // header bytes, payload bytes, nested values
            let (head, body, items): (usize, u64, u64) = match tag {
                NIL|
                FALSE|
                TRUE|
                MIN_POSFIXINT..=MAX_POSFIXINT|
                NEGFIXINT..=0xff => (1, 0, 0),
                FIXMAP..=FIXMAP_MAX => (1, 0, 2 * u64::from(tag & MAX_FIXMAP_SIZE as u8)),
                FIXARRAY..=FIXARRAY_MAX => (1, 0, u64::from(tag & MAX_FIXARRAY_SIZE as u8)),
                FIXSTR..=FIXSTR_MAX => (1, u64::from(tag & MAX_FIXSTR_SIZE as u8), 0),
                RESERVED => {
                    debug!("reserved code while skipping");
                    return Err(Error::ReservedCode)
                }
                BIN_8|STR_8 => (2, self.fetch_u8(1).await?.into(), 0),
                BIN_16|STR_16 => (3, self.fetch_u16(1).await?.into(), 0),
                BIN_32|STR_32 => (5, self.fetch_u32(1).await?.into(), 0),
                EXT_8 => (3, self.fetch_u8(1).await?.into(), 0),
                EXT_16 => (4, self.fetch_u16(1).await?.into(), 0),
                EXT_32 => (6, self.fetch_u32(1).await?.into(), 0),
                FLOAT_32 => (1, 4, 0),
                FLOAT_64 => (1, 8, 0),
                UINT_8|INT_8 => (1, 1, 0),
                UINT_16|INT_16 => (1, 2, 0),
                UINT_32|INT_32 => (1, 4, 0),
                UINT_64|INT_64 => (1, 8, 0),
                FIXEXT_1 => (2, 1, 0),
                FIXEXT_2 => (2, 2, 0),
                FIXEXT_4 => (2, 4, 0),
                FIXEXT_8 => (2, 8, 0),
                FIXEXT_16 => (2, 16, 0),
                ARRAY_16 => (3, 0, self.fetch_u16(1).await?.into()),
                ARRAY_32 => (5, 0, self.fetch_u32(1).await?.into()),
                MAP_16 => (3, 0, 2 * u64::from(self.fetch_u16(1).await?)),
                MAP_32 => (5, 0, 2 * u64::from(self.fetch_u32(1).await?)),
            };
            self.fetch_peek(head).await?;
            self.source.advance(head)?;
            if body != 0 {
                let body = usize::try_from(body).map_err(|_| Error::UnexpectedEof)?;
                self.source.discard(body).await?;
            }
            pending = (pending - 1).saturating_add(items);
        }
        Ok(true)
    }
}

macro_rules! impl_read_int {
    ($($ty:ty: $read:ident, $checked:ident;)*) => {
        impl<S: ReadSource> Reader<S> {$(
            #[doc = concat!("Decode an integer that must fit in `", stringify!($ty), "`")]
            pub async fn $read(&mut self) -> Result<Option<$ty>> {
                self.read_checked(DecodedInteger::$checked).await
            }
        )*}
    };
}

impl_read_int! {
    u8: read_u8, checked_u8;
    u16: read_u16, checked_u16;
    u32: read_u32, checked_u32;
    u64: read_u64, checked_u64;
    usize: read_usize, checked_usize;
    i8: read_i8, checked_i8;
    i16: read_i16, checked_i16;
    i32: read_i32, checked_i32;
    i64: read_i64, checked_i64;
    isize: read_isize, checked_isize;
}

impl<'de> Reader<SliceReader<'de>> {
    /// Decode the next string borrowing it from the input
    pub async fn read_borrowed_str(&mut self) -> Result<Option<&'de str>> {
        let Some((len, head)) = self.str_head().await? else {
            return Ok(None)
        };
        let bytes = self.source.remaining().get(..head + len).ok_or(Error::UnexpectedEof)?;
        let s = str::from_utf8(&bytes[head..])?;
        self.source.take(head + len)?;
        Ok(Some(s))
    }

    /// Decode the next binary borrowing it from the input
    pub async fn read_borrowed_bin(&mut self) -> Result<Option<&'de [u8]>> {
        let Some((len, head)) = self.bin_head().await? else {
            return Ok(None)
        };
        let bytes = self.source.take(head + len)?;
        Ok(Some(&bytes[head..]))
    }
}
