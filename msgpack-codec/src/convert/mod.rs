//! Converters: the typed encoding and decoding of values.
//!
//! A converter is a zero-sized type implementing [`Converter<T>`] for one or
//! more value types. Converters of compound values take the converters of
//! their parts as type parameters, e.g. `SeqConverter<MapConverter<StringConverter,
//! PrimitiveConverter>>` encodes a `Vec<BTreeMap<String, u32>>`.
//!
//! [`DefaultConverter`] picks a converter for a type, which the encoding and
//! decoding entry points use when none is given explicitly.
//!
//! Converters of self-referencing types recurse in their futures, so such
//! types need a hand-written converter which boxes the nested futures.
use core::future::Future;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, SerializerOptions};

mod primitive;
mod string;
mod seq;
mod map;
mod tuple;
mod enums;
mod nullable;
mod time;
pub mod record;

pub use primitive::PrimitiveConverter;
pub use string::{StringConverter, BytesConverter};
pub use seq::SeqConverter;
pub use map::MapConverter;
pub use tuple::{TupleConverter, TupleItems, RestConverter};
pub use enums::{MessagePackEnum, EnumRepr, EnumConverter, EnumStringConverter};
pub use nullable::{NullableConverter, BoxConverter, EmptyObject, EmptyObjectConverter};
pub use time::TimestampConverter;

/// Collections never pre-allocate more elements than this, whatever their
/// declared count.
pub const MAX_PREALLOC: usize = 4096;

/// Encodes and decodes values of type `T`.
///
/// `read` must consume exactly the bytes `write` produces.
pub trait Converter<T> {
    fn write<W: WriteTarget>(
        writer: &mut Writer<W>,
        value: &T,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<()>>;

    fn read<S: ReadSource>(
        reader: &mut Reader<S>,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<T>>;
}

/// Types with a converter chosen for them.
pub trait DefaultConverter: Sized {
    type Converter: Converter<Self>;
}

/// Encode `value` with its default converter
pub async fn write_default<W, T>(writer: &mut Writer<W>, value: &T, options: &SerializerOptions) -> Result<()>
    where W: WriteTarget, T: DefaultConverter
{
    <T::Converter as Converter<T>>::write(writer, value, options).await
}

/// Decode a value with its default converter
pub async fn read_default<S, T>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<T>
    where S: ReadSource, T: DefaultConverter
{
    <T::Converter as Converter<T>>::read(reader, options).await
}

#[doc(hidden)]
pub fn __read_as<'a, C, T, S>(
    _slot: &T,
    reader: &'a mut Reader<S>,
    options: &'a SerializerOptions
) -> impl Future<Output = Result<T>> + use<'a, C, T, S>
    where C: Converter<T>, S: ReadSource
{
    C::read(reader, options)
}

/// Skip a value inside a structure, where missing input is an error.
pub(crate) async fn skip_value<S: ReadSource>(reader: &mut Reader<S>) -> Result<()> {
    if reader.skip_once().await? {
        Ok(())
    }
    else {
        Err(crate::Error::UnexpectedEof)
    }
}
