use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, MessagePackType, SerializerOptions, Timestamp};
use super::{Converter, DefaultConverter};

/// Converter of points in time written as timestamp extensions.
///
/// Time zone offsets are not stored; date-times with an offset read back in UTC.
#[derive(Debug, Clone, Copy)]
pub struct TimestampConverter;

async fn read_timestamp<S: ReadSource>(reader: &mut Reader<S>) -> Result<Timestamp> {
    match reader.read_timestamp().await? {
        Some(ts) => Ok(ts),
        None => reader.unexpected(MessagePackType::Extension).await
    }
}

impl Converter<Timestamp> for TimestampConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Timestamp, _options: &SerializerOptions) -> Result<()> {
        writer.write_timestamp(*value).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<Timestamp> {
        read_timestamp(reader).await
    }
}

impl DefaultConverter for Timestamp {
    type Converter = TimestampConverter;
}

#[cfg(feature = "std")]
impl Converter<std::time::SystemTime> for TimestampConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &std::time::SystemTime, _options: &SerializerOptions) -> Result<()> {
        writer.write_timestamp((*value).into()).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<std::time::SystemTime> {
        read_timestamp(reader).await.map(Into::into)
    }
}

#[cfg(feature = "std")]
impl DefaultConverter for std::time::SystemTime {
    type Converter = TimestampConverter;
}

#[cfg(feature = "chrono")]
impl Converter<chrono::DateTime<chrono::Utc>> for TimestampConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &chrono::DateTime<chrono::Utc>, _options: &SerializerOptions) -> Result<()> {
        writer.write_timestamp((*value).into()).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<chrono::DateTime<chrono::Utc>> {
        read_timestamp(reader).await?.try_into()
    }
}

#[cfg(feature = "chrono")]
impl DefaultConverter for chrono::DateTime<chrono::Utc> {
    type Converter = TimestampConverter;
}

#[cfg(feature = "chrono")]
impl Converter<chrono::DateTime<chrono::FixedOffset>> for TimestampConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &chrono::DateTime<chrono::FixedOffset>, _options: &SerializerOptions) -> Result<()> {
        writer.write_timestamp((*value).into()).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<chrono::DateTime<chrono::FixedOffset>> {
        let utc: chrono::DateTime<chrono::Utc> = Self::read(reader, options).await?;
        Ok(utc.fixed_offset())
    }
}

#[cfg(feature = "chrono")]
impl DefaultConverter for chrono::DateTime<chrono::FixedOffset> {
    type Converter = TimestampConverter;
}
