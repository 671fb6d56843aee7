use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, Error, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter};

/// Converter of booleans, numbers, `char` and `()`.
///
/// Integers are written in their smallest representation and read from any
/// integer encoding the value fits in. 128-bit integers are written as 16
/// big-endian bytes.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveConverter;

macro_rules! impl_int_converter {
    ($($ty:ty: $write:ident as $wide:ty, $read:ident;)*) => {$(
        impl Converter<$ty> for PrimitiveConverter {
            async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &$ty, _options: &SerializerOptions) -> Result<()> {
                writer.$write(*value as $wide).await
            }

            async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<$ty> {
                match reader.$read().await? {
                    Some(v) => Ok(v),
                    None => reader.unexpected(MessagePackType::Integer).await
                }
            }
        }

        impl DefaultConverter for $ty {
            type Converter = PrimitiveConverter;
        }
    )*};
}

impl_int_converter! {
    u8: write_u64 as u64, read_u8;
    u16: write_u64 as u64, read_u16;
    u32: write_u64 as u64, read_u32;
    u64: write_u64 as u64, read_u64;
    usize: write_u64 as u64, read_usize;
    i8: write_i64 as i64, read_i8;
    i16: write_i64 as i64, read_i16;
    i32: write_i64 as i64, read_i32;
    i64: write_i64 as i64, read_i64;
    isize: write_i64 as i64, read_isize;
}

macro_rules! impl_converter {
    ($ty:ty, $expected:ident, |$w:ident, $v:ident| $write:expr, |$r:ident| $read:expr) => {
        impl Converter<$ty> for PrimitiveConverter {
            async fn write<W: WriteTarget>($w: &mut Writer<W>, $v: &$ty, _options: &SerializerOptions) -> Result<()> {
                $write.await
            }

            async fn read<S: ReadSource>($r: &mut Reader<S>, _options: &SerializerOptions) -> Result<$ty> {
                match $read.await? {
                    Some(v) => Ok(v),
                    None => $r.unexpected(MessagePackType::$expected).await
                }
            }
        }

        impl DefaultConverter for $ty {
            type Converter = PrimitiveConverter;
        }
    };
}

impl_converter!(bool, Boolean, |w, v| w.write_bool(*v), |r| r.read_bool());
impl_converter!(f32, Float, |w, v| w.write_f32(*v), |r| r.read_f32());
impl_converter!(f64, Float, |w, v| w.write_f64(*v), |r| r.read_f64());
impl_converter!(u128, Binary, |w, v| w.write_u128_as_bytes(*v), |r| r.read_u128_from_bytes());
impl_converter!(i128, Binary, |w, v| w.write_i128_as_bytes(*v), |r| r.read_i128_from_bytes());
#[cfg(feature = "uuid")]
impl_converter!(uuid::Uuid, Binary, |w, v| w.write_uuid(v), |r| r.read_uuid());
#[cfg(feature = "rust_decimal")]
impl_converter!(rust_decimal::Decimal, Binary, |w, v| w.write_decimal(v), |r| r.read_decimal());

impl Converter<()> for PrimitiveConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, _value: &(), _options: &SerializerOptions) -> Result<()> {
        writer.write_nil().await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<()> {
        if reader.read_nil().await? {
            return Ok(())
        }
        reader.unexpected(MessagePackType::Nil).await
    }
}

impl DefaultConverter for () {
    type Converter = PrimitiveConverter;
}

impl Converter<char> for PrimitiveConverter {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &char, _options: &SerializerOptions) -> Result<()> {
        let mut buf = [0u8; 4];
        writer.write_str(value.encode_utf8(&mut buf)).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, _options: &SerializerOptions) -> Result<char> {
        let single = reader.read_str_with(|s| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None
            }
        }).await?;
        match single {
            Some(Some(c)) => Ok(c),
            Some(None) => Err(Error::InvalidValue("char")),
            None => reader.unexpected(MessagePackType::String).await
        }
    }
}

impl DefaultConverter for char {
    type Converter = PrimitiveConverter;
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use crate::{to_vec, from_slice, Error, MessagePackType};

    #[test]
    fn test_primitives_round_trip() {
        macro_rules! round_trip {
            ($($v:expr => [$($byte:expr),*]),* $(,)?) => {$(
                let bytes = to_vec(&$v).unwrap();
                assert_eq!(bytes, [$($byte),*], "{:?}", $v);
                assert_eq!(from_slice(&bytes), Ok(($v, bytes.len())));
            )*};
        }
        round_trip! {
            true => [0xc3],
            () => [0xc0],
            123456u32 => [0xce, 0x00, 0x01, 0xe2, 0x40],
            -123456i32 => [0xd2, 0xff, 0xfe, 0x1d, 0xc0],
            -33i8 => [0xd0, 0xdf],
            300usize => [0xcd, 0x01, 0x2c],
            -1isize => [0xff],
            123.456f64 => [0xcb, 0x40, 0x5e, 0xdd, 0x2f, 0x1a, 0x9f, 0xbe, 0x77],
            456.0f32 => [0xca, 0x43, 0xe4, 0x00, 0x00],
            'ż' => [0xa2, 0xc5, 0xbc],
            1u128 => [0xc4, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        }
    }

    #[test]
    fn test_primitive_mismatch() {
        assert_eq!(from_slice::<u8>(b"\xcd\x01\x00"), Err(Error::IntegerOverflow));
        assert_eq!(from_slice::<u32>(b"\xff"), Err(Error::IntegerOverflow));
        assert_eq!(from_slice::<u32>(b"\xa0"), Err(Error::UnexpectedType {
            expected: MessagePackType::Integer, found: MessagePackType::String }));
        assert_eq!(from_slice::<f64>(b"\x01"), Err(Error::UnexpectedType {
            expected: MessagePackType::Float, found: MessagePackType::Integer }));
        assert_eq!(from_slice::<bool>(b""), Err(Error::UnexpectedEof));
        assert_eq!(from_slice::<()>(b"\xc1"), Err(Error::ReservedCode));
        assert_eq!(from_slice::<char>(b"\xa2ab"), Err(Error::InvalidValue("char")));
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn test_uuid() {
        let id = uuid::uuid!("5af5c532-4c91-4cd0-b541-15a405395fc5");
        let bytes = to_vec(&id).unwrap();
        assert_eq!(bytes, [0xc4, 0x10, 0x5a, 0xf5, 0xc5, 0x32, 0x4c, 0x91, 0x4c, 0xd0,
                           0xb5, 0x41, 0x15, 0xa4, 0x05, 0x39, 0x5f, 0xc5]);
        assert_eq!(from_slice(&bytes), Ok((id, 18)));
    }

    #[cfg(feature = "rust_decimal")]
    #[test]
    fn test_decimal() {
        use rust_decimal::Decimal;
        let v = Decimal::new(-12345, 3);
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes, [0xc4, 0x10,
                           0x80, 0x03, 0x00, 0x00,
                           0x00, 0x00, 0x00, 0x00,
                           0x00, 0x00, 0x00, 0x00,
                           0x00, 0x00, 0x30, 0x39]);
        assert_eq!(from_slice(&bytes), Ok((v, 18)));
    }
}
