#[cfg(feature = "alloc")]
use alloc::{boxed::Box, string::String, vec::Vec};
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, Error, MessagePackType, SerializerOptions};
use super::Converter;
#[cfg(feature = "alloc")]
use super::DefaultConverter;

/// Converter of owned strings
#[derive(Debug, Clone, Copy)]
pub struct StringConverter;

/// Converter of byte blobs written as `bin`
#[derive(Debug, Clone, Copy)]
pub struct BytesConverter;

#[cfg(feature = "alloc")]
impl Converter<String> for StringConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &String, _options: &SerializerOptions) -> Result<()> {
        writer.write_str(value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<String> {
        match reader.read_string().await? {
            Some(s) => Ok(s),
            None => reader.unexpected(MessagePackType::String).await
        }
    }
}

#[cfg(feature = "alloc")]
impl DefaultConverter for String {
    type Converter = StringConverter;
}

#[cfg(feature = "alloc")]
impl Converter<Box<str>> for StringConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Box<str>, _options: &SerializerOptions) -> Result<()> {
        writer.write_str(value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<Box<str>> {
        <Self as Converter<String>>::read(reader, options).await.map(String::into_boxed_str)
    }
}

#[cfg(feature = "alloc")]
impl Converter<Vec<u8>> for BytesConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Vec<u8>, _options: &SerializerOptions) -> Result<()> {
        writer.write_bin(value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<Vec<u8>> {
        match reader.read_bin().await? {
            Some(v) => Ok(v),
            None => reader.unexpected(MessagePackType::Binary).await
        }
    }
}

#[cfg(feature = "alloc")]
impl Converter<Box<[u8]>> for BytesConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Box<[u8]>, _options: &SerializerOptions) -> Result<()> {
        writer.write_bin(value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<Box<[u8]>> {
        <Self as Converter<Vec<u8>>>::read(reader, options).await.map(Vec::into_boxed_slice)
    }
}

/// A fixed-size blob must match its declared length exactly
impl<const N: usize> Converter<[u8; N]> for BytesConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &[u8; N], _options: &SerializerOptions) -> Result<()> {
        writer.write_bin(value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<[u8; N]> {
        match reader.peek_bin_len().await? {
            Some(len) if len == N => {}
            Some(_) => return Err(Error::InvalidBinaryLength),
            None => return reader.unexpected(MessagePackType::Binary).await
        }
        let mut out = [0u8; N];
        reader.read_bin_into(&mut out).await?;
        Ok(out)
    }
}
