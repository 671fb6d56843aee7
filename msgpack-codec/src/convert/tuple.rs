use core::future::Future;
use core::marker::PhantomData;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, Error, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter};

/// Element-wise conversion of a tuple `T`, implemented for tuples of
/// converters and for [`RestConverter`].
pub trait TupleItems<T> {
    /// Number of array slots the tuple occupies
    const ARITY: usize;

    fn write_items<W: WriteTarget>(
        writer: &mut Writer<W>,
        value: &T,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<()>>;

    fn read_items<S: ReadSource>(
        reader: &mut Reader<S>,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<T>>;
}

/// Converter of tuples written as arrays of [`TupleItems::ARITY`] elements.
///
/// `C` is a tuple of element converters, e.g. `TupleConverter<(PrimitiveConverter,
/// StringConverter)>` converts `(u8, String)`.
#[derive(Debug, Clone, Copy)]
pub struct TupleConverter<C>(PhantomData<C>);

/// Items of a tuple whose last element is itself a tuple written inline.
///
/// `C` is a tuple of the converters of the first seven elements and `R`
/// converts the items of the last one, so `(T1, .., T7, (T8, T9))` is
/// written as an array of nine elements.
#[derive(Debug, Clone, Copy)]
pub struct RestConverter<C, R>(PhantomData<(C, R)>);

impl<T, C: TupleItems<T>> Converter<T> for TupleConverter<C> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &T, options: &SerializerOptions) -> Result<()> {
        writer.write_array_len(C::ARITY).await?;
        C::write_items(writer, value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<T> {
        match reader.read_array_len().await? {
            Some(len) if len == C::ARITY => C::read_items(reader, options).await,
            Some(len) => Err(Error::ArityMismatch { expected: C::ARITY, found: len }),
            None => reader.unexpected(MessagePackType::Array).await
        }
    }
}

macro_rules! impl_tuple {
    ($len:expr => $(($idx:tt $t:ident $c:ident)),+) => {
        impl<$($t, $c: Converter<$t>),+> TupleItems<($($t,)+)> for ($($c,)+) {
            const ARITY: usize = $len;

            async fn write_items<W: WriteTarget>(
                    writer: &mut Writer<W>,
                    value: &($($t,)+),
                    options: &SerializerOptions
                ) -> Result<()>
            {
                $(<$c as Converter<$t>>::write(writer, &value.$idx, options).await?;)+
                Ok(())
            }

            async fn read_items<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<($($t,)+)> {
                Ok(($(<$c as Converter<$t>>::read(reader, options).await?,)+))
            }
        }

        impl<$($t: DefaultConverter),+> DefaultConverter for ($($t,)+) {
            type Converter = TupleConverter<($($t::Converter,)+)>;
        }
    };
}

impl_tuple!(1 => (0 T0 C0));
impl_tuple!(2 => (0 T0 C0), (1 T1 C1));
impl_tuple!(3 => (0 T0 C0), (1 T1 C1), (2 T2 C2));
impl_tuple!(4 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3));
impl_tuple!(5 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4));
impl_tuple!(6 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5));
impl_tuple!(7 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6));
impl_tuple!(8 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6),
                 (7 T7 C7));
impl_tuple!(9 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6),
                 (7 T7 C7), (8 T8 C8));
impl_tuple!(10 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6),
                  (7 T7 C7), (8 T8 C8), (9 T9 C9));
impl_tuple!(11 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6),
                  (7 T7 C7), (8 T8 C8), (9 T9 C9), (10 T10 C10));
impl_tuple!(12 => (0 T0 C0), (1 T1 C1), (2 T2 C2), (3 T3 C3), (4 T4 C4), (5 T5 C5), (6 T6 C6),
                  (7 T7 C7), (8 T8 C8), (9 T9 C9), (10 T10 C10), (11 T11 C11));

impl<T0, T1, T2, T3, T4, T5, T6, R, C0, C1, C2, C3, C4, C5, C6, CR>
    TupleItems<(T0, T1, T2, T3, T4, T5, T6, R)> for RestConverter<(C0, C1, C2, C3, C4, C5, C6), CR>
    where C0: Converter<T0>, C1: Converter<T1>, C2: Converter<T2>, C3: Converter<T3>,
          C4: Converter<T4>, C5: Converter<T5>, C6: Converter<T6>, CR: TupleItems<R>
{
    const ARITY: usize = 7 + CR::ARITY;

    async fn write_items<W: WriteTarget>(
            writer: &mut Writer<W>,
            value: &(T0, T1, T2, T3, T4, T5, T6, R),
            options: &SerializerOptions
        ) -> Result<()>
    {
        C0::write(writer, &value.0, options).await?;
        C1::write(writer, &value.1, options).await?;
        C2::write(writer, &value.2, options).await?;
        C3::write(writer, &value.3, options).await?;
        C4::write(writer, &value.4, options).await?;
        C5::write(writer, &value.5, options).await?;
        C6::write(writer, &value.6, options).await?;
        CR::write_items(writer, &value.7, options).await
    }

    async fn read_items<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<(T0, T1, T2, T3, T4, T5, T6, R)> {
        Ok((
            C0::read(reader, options).await?,
            C1::read(reader, options).await?,
            C2::read(reader, options).await?,
            C3::read(reader, options).await?,
            C4::read(reader, options).await?,
            C5::read(reader, options).await?,
            C6::read(reader, options).await?,
            CR::read_items(reader, options).await?
        ))
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use alloc::string::String;
    use crate::*;
    use crate::convert::{PrimitiveConverter as P, StringConverter, TupleConverter, RestConverter};

    #[test]
    fn test_tuples() {
        let v = (1u8, String::from("a"), -1i64);
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes, b"\x93\x01\xa1a\xff");
        assert_eq!(from_slice(&bytes), Ok((v, 5)));
        let v = (1u8,);
        assert_eq!(to_vec(&v).unwrap(), [0x91, 0x01]);
        let v = (1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, 8u8, 9u8);
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes, [0x99, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(from_slice(&bytes), Ok((v, 10)));
        let v = (1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, 8u8, 9u8, 10u8, 11u8, 12u8);
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes[0], 0x9c);
        assert_eq!(from_slice(&bytes), Ok((v, 13)));
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        assert_eq!(from_slice::<(u8, u8)>(b"\x93\x01\x02\x03"),
                   Err(Error::ArityMismatch { expected: 2, found: 3 }));
        assert_eq!(from_slice::<(u8, u8)>(b"\x91\x01"),
                   Err(Error::ArityMismatch { expected: 2, found: 1 }));
        assert_eq!(from_slice::<(u8,)>(b"\x01"), Err(Error::UnexpectedType {
            expected: MessagePackType::Array, found: MessagePackType::Integer }));
    }

    #[test]
    fn test_rest_tuple_is_flat() {
        type Rest = TupleConverter<RestConverter<(P, P, P, P, P, P, P), (P, StringConverter)>>;
        let opts = SerializerOptions::DEFAULT;
        let v = (1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, (8u16, String::from("x")));
        let bytes = to_vec_with::<_, Rest>(&v, &opts).unwrap();
        assert_eq!(bytes, [0x99, 1, 2, 3, 4, 5, 6, 7, 8, 0xa1, b'x']);
        assert_eq!(from_slice_with::<_, Rest>(&bytes, &opts), Ok((v, 11)));
        assert_eq!(from_slice_with::<(u8, u8, u8, u8, u8, u8, u8, (u16, String)), Rest>(
                   b"\x98\x01\x02\x03\x04\x05\x06\x07\x92\x08\xa0", &opts),
                   Err(Error::ArityMismatch { expected: 9, found: 8 }));
    }
}
