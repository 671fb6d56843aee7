use core::fmt::{self, Write as _};
use core::marker::PhantomData;
use core::str::FromStr;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, Error, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter};

/// An integer type backing an enum
pub trait EnumRepr: Copy + Default + FromStr + fmt::Display + DefaultConverter {}

impl<T> EnumRepr for T where T: Copy + Default + FromStr + fmt::Display + DefaultConverter {}

/// Enums convertible to and from their integer values and names.
///
/// Implement it with the [`msgpack_enum!`](crate::msgpack_enum) macro or by
/// hand, e.g. for flag sets where not every value has a name.
pub trait MessagePackEnum: Sized + Copy {
    type Repr: EnumRepr;
    fn to_repr(self) -> Self::Repr;
    fn from_repr(repr: Self::Repr) -> Option<Self>;
    /// The name written in string mode, `None` writes the integer value as text
    fn name(self) -> Option<&'static str>;
    fn from_name(name: &str) -> Option<Self>;
}

/// Converter of enums written as integers unless [`EnumMode::String`](crate::EnumMode::String) is set
#[derive(Debug, Clone, Copy)]
pub struct EnumConverter<E>(PhantomData<E>);

/// Converter of enums written as names unless [`EnumMode::Number`](crate::EnumMode::Number) is set
#[derive(Debug, Clone, Copy)]
pub struct EnumStringConverter<E>(PhantomData<E>);

/// Formats an integer without allocating
struct ReprText {
    buf: [u8; 40],
    len: usize
}

impl fmt::Write for ReprText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        self.buf.get_mut(self.len..end).ok_or(fmt::Error)?.copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

async fn write_enum<W, E>(writer: &mut Writer<W>, value: E, as_string: bool, options: &SerializerOptions) -> Result<()>
    where W: WriteTarget, E: MessagePackEnum
{
    let repr = value.to_repr();
    if !as_string {
        return <<E::Repr as DefaultConverter>::Converter as Converter<E::Repr>>::write(writer, &repr, options).await
    }
    match value.name() {
        Some(name) => writer.write_str(name).await,
        None => {
            let mut text = ReprText { buf: [0; 40], len: 0 };
            write!(text, "{}", repr).map_err(|_| Error::InvalidValue("enum value"))?;
            writer.write_str_utf8(&text.buf[..text.len]).await
        }
    }
}

/// Accept a name, a number or nil whatever the mode.
async fn read_enum<S, E>(reader: &mut Reader<S>, as_string: bool, options: &SerializerOptions) -> Result<E>
    where S: ReadSource, E: MessagePackEnum
{
    match reader.peek_type().await? {
        MessagePackType::String => {
            let found = reader.read_str_with(|name| {
                E::from_name(name).or_else(|| name.parse().ok().and_then(E::from_repr))
            }).await?;
            found.flatten().ok_or(Error::UnknownVariant)
        }
        MessagePackType::Integer => {
            let repr = <<E::Repr as DefaultConverter>::Converter as Converter<E::Repr>>::read(reader, options).await?;
            E::from_repr(repr).ok_or(Error::UnknownVariant)
        }
        MessagePackType::Nil => {
            reader.read_nil().await?;
            E::from_repr(E::Repr::default()).ok_or(Error::UnknownVariant)
        }
        _ => {
            let expected = if as_string { MessagePackType::String } else { MessagePackType::Integer };
            reader.unexpected(expected).await
        }
    }
}

impl<E: MessagePackEnum> Converter<E> for EnumConverter<E> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &E, options: &SerializerOptions) -> Result<()> {
        write_enum(writer, *value, options.enum_as_string(false), options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<E> {
        read_enum(reader, options.enum_as_string(false), options).await
    }
}

impl<E: MessagePackEnum> Converter<E> for EnumStringConverter<E> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &E, options: &SerializerOptions) -> Result<()> {
        write_enum(writer, *value, options.enum_as_string(true), options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<E> {
        read_enum(reader, options.enum_as_string(true), options).await
    }
}
