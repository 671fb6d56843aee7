#[cfg(feature = "alloc")]
use alloc::boxed::Box;
use core::marker::PhantomData;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter, skip_value};

/// Converter of optional values: `None` is nil, `Some` is converted by `C`
#[derive(Debug, Clone, Copy)]
pub struct NullableConverter<C>(PhantomData<C>);

impl<T, C: Converter<T>> Converter<Option<T>> for NullableConverter<C> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Option<T>, options: &SerializerOptions) -> Result<()> {
        match value {
            Some(v) => C::write(writer, v, options).await,
            None => writer.write_nil().await
        }
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<Option<T>> {
        if reader.read_nil().await? {
            return Ok(None)
        }
        C::read(reader, options).await.map(Some)
    }
}

impl<T: DefaultConverter> DefaultConverter for Option<T> {
    type Converter = NullableConverter<T::Converter>;
}

/// Converter of boxed values, written as the value itself
#[derive(Debug, Clone, Copy)]
pub struct BoxConverter<C>(PhantomData<C>);

#[cfg(feature = "alloc")]
impl<T, C: Converter<T>> Converter<Box<T>> for BoxConverter<C> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Box<T>, options: &SerializerOptions) -> Result<()> {
        C::write(writer, value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<Box<T>> {
        C::read(reader, options).await.map(Box::new)
    }
}

#[cfg(feature = "alloc")]
impl<T: DefaultConverter> DefaultConverter for Box<T> {
    type Converter = BoxConverter<T::Converter>;
}

/// A value without content.
///
/// Written as an empty array, or an empty map when records are written as
/// maps. Any array or map is accepted on read and its content is skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyObject;

#[derive(Debug, Clone, Copy)]
pub struct EmptyObjectConverter;

impl Converter<EmptyObject> for EmptyObjectConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, _value: &EmptyObject, options: &SerializerOptions) -> Result<()> {
        if options.struct_as_array(true) {
            writer.write_array_len(0).await
        }
        else {
            writer.write_map_len(0).await
        }
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<EmptyObject> {
        match reader.peek_type().await? {
            MessagePackType::Array|MessagePackType::Map => {
                skip_value(reader).await?;
                Ok(EmptyObject)
            }
            _ => reader.unexpected(MessagePackType::Map).await
        }
    }
}

impl DefaultConverter for EmptyObject {
    type Converter = EmptyObjectConverter;
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use alloc::{boxed::Box, vec::Vec};
    use crate::*;

    #[test]
    fn test_option() {
        assert_eq!(to_vec(&None::<u32>).unwrap(), [0xc0]);
        assert_eq!(to_vec(&Some(300u32)).unwrap(), [0xcd, 0x01, 0x2c]);
        assert_eq!(from_slice(&[0xc0]), Ok((None::<u32>, 1)));
        assert_eq!(from_slice(&[0xcd, 0x01, 0x2c]), Ok((Some(300u32), 3)));
        let v: Vec<Option<bool>> = [Some(true), None].into();
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes, [0x92, 0xc3, 0xc0]);
        assert_eq!(from_slice(&bytes), Ok((v, 3)));
    }

    #[test]
    fn test_box() {
        let v = Box::new(-7i16);
        assert_eq!(to_vec(&v).unwrap(), [0xf9]);
        assert_eq!(from_slice(&[0xf9]), Ok((v, 1)));
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(to_vec(&EmptyObject).unwrap(), [0x90]);
        let opts = SerializerOptions::DEFAULT.with_struct_mode(StructMode::AsMap);
        assert_eq!(to_vec_with::<_, convert::EmptyObjectConverter>(&EmptyObject, &opts).unwrap(), [0x80]);
        assert_eq!(from_slice(b"\x80"), Ok((EmptyObject, 1)));
        assert_eq!(from_slice(b"\x82\x01\x92\x02\x03\xa1a\xc0"), Ok((EmptyObject, 8)));
        assert_eq!(from_slice::<EmptyObject>(b"\x92\x01"), Err(Error::UnexpectedEof));
        assert_eq!(from_slice::<EmptyObject>(b"\xc0"), Err(Error::UnexpectedType {
            expected: MessagePackType::Map, found: MessagePackType::Nil }));
    }
}
