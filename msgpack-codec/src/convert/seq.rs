#[cfg(feature = "alloc")]
use alloc::{boxed::Box, vec::Vec, collections::{VecDeque, LinkedList, BTreeSet}};
use core::marker::PhantomData;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter, MAX_PREALLOC};

/// Converter of sequences written as arrays, with `C` converting the elements
#[derive(Debug, Clone, Copy)]
pub struct SeqConverter<C>(PhantomData<C>);

async fn write_seq<'a, W, T, C, I>(
        writer: &mut Writer<W>,
        len: usize,
        items: I,
        options: &SerializerOptions
    ) -> Result<()>
    where W: WriteTarget, T: 'a, C: Converter<T>, I: IntoIterator<Item = &'a T>
{
    writer.write_array_len(len).await?;
    for item in items {
        C::write(writer, item, options).await?;
    }
    Ok(())
}

/// Read an array header, create the collection for its length with `init`
/// and `push` every element into it.
async fn read_seq<S, T, C, R>(
        reader: &mut Reader<S>,
        options: &SerializerOptions,
        init: impl FnOnce(usize) -> R,
        mut push: impl FnMut(&mut R, T)
    ) -> Result<R>
    where S: ReadSource, C: Converter<T>
{
    let Some(len) = reader.read_array_len().await? else {
        return reader.unexpected(MessagePackType::Array).await
    };
    let mut coll = init(len.min(MAX_PREALLOC));
    for _ in 0..len {
        let item = C::read(reader, options).await?;
        push(&mut coll, item);
    }
    Ok(coll)
}

macro_rules! impl_seq_converter {
    ($($coll:ident<T $(: $bound:ident $(+ $more:ident)*)?>, $init:expr, $push:ident;)*) => {$(
        #[cfg(feature = "alloc")]
        impl<T $(: $bound $(+ $more)*)?, C: Converter<T>> Converter<$coll<T>> for SeqConverter<C> {
            async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &$coll<T>, options: &SerializerOptions) -> Result<()> {
                write_seq::<W, T, C, _>(writer, value.len(), value, options).await
            }

            async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<$coll<T>> {
                read_seq::<S, T, C, $coll<T>>(reader, options, $init, |coll, item| { coll.$push(item); }).await
            }
        }

        #[cfg(feature = "alloc")]
        impl<T: DefaultConverter $(+ $bound $(+ $more)*)?> DefaultConverter for $coll<T> {
            type Converter = SeqConverter<T::Converter>;
        }
    )*};
}

impl_seq_converter! {
    Vec<T>, Vec::with_capacity, push;
    VecDeque<T>, VecDeque::with_capacity, push_back;
    LinkedList<T>, |_| LinkedList::new(), push_back;
    BTreeSet<T: Ord>, |_| BTreeSet::new(), insert;
}

#[cfg(feature = "alloc")]
impl<T, C: Converter<T>> Converter<Box<[T]>> for SeqConverter<C> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &Box<[T]>, options: &SerializerOptions) -> Result<()> {
        write_seq::<W, T, C, _>(writer, value.len(), value.iter(), options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<Box<[T]>> {
        <Self as Converter<Vec<T>>>::read(reader, options).await.map(Vec::into_boxed_slice)
    }
}

#[cfg(feature = "std")]
impl<T, H, C> Converter<std::collections::HashSet<T, H>> for SeqConverter<C>
    where T: Eq + core::hash::Hash, H: core::hash::BuildHasher + Default, C: Converter<T>
{
    async fn write<W: WriteTarget>(
            writer: &mut Writer<W>,
            value: &std::collections::HashSet<T, H>,
            options: &SerializerOptions
        ) -> Result<()>
    {
        write_seq::<W, T, C, _>(writer, value.len(), value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<std::collections::HashSet<T, H>> {
        read_seq::<S, T, C, _>(reader, options,
            |n| std::collections::HashSet::with_capacity_and_hasher(n, H::default()),
            |coll, item| { coll.insert(item); }).await
    }
}

#[cfg(feature = "std")]
impl<T, H> DefaultConverter for std::collections::HashSet<T, H>
    where T: DefaultConverter + Eq + core::hash::Hash, H: core::hash::BuildHasher + Default
{
    type Converter = SeqConverter<T::Converter>;
}

/// Fixed-size arrays must match their length exactly
#[cfg(feature = "alloc")]
impl<T, C: Converter<T>, const N: usize> Converter<[T; N]> for SeqConverter<C> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &[T; N], options: &SerializerOptions) -> Result<()> {
        write_seq::<W, T, C, _>(writer, N, value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<[T; N]> {
        let Some(len) = reader.read_array_len().await? else {
            return reader.unexpected(MessagePackType::Array).await
        };
        if len != N {
            return Err(crate::Error::ArityMismatch { expected: N, found: len })
        }
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(C::read(reader, options).await?);
        }
        items.try_into().map_err(|_| crate::Error::ArityMismatch { expected: N, found: len })
    }
}

#[cfg(feature = "alloc")]
impl<T: DefaultConverter, const N: usize> DefaultConverter for [T; N] {
    type Converter = SeqConverter<T::Converter>;
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use alloc::{vec, vec::Vec, collections::{VecDeque, LinkedList, BTreeSet}, string::String};
    use crate::*;

    #[test]
    fn test_sequences() {
        let v = vec![1u32, 300, 70000];
        let bytes = to_vec(&v).unwrap();
        assert_eq!(bytes, [0x93, 0x01, 0xcd, 0x01, 0x2c, 0xce, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(from_slice(&bytes), Ok((v.clone(), bytes.len())));
        assert_eq!(from_slice(&bytes), Ok((VecDeque::from(v.clone()), bytes.len())));
        assert_eq!(from_slice(&bytes), Ok((v.iter().copied().collect::<LinkedList<_>>(), bytes.len())));
        assert_eq!(from_slice(&bytes), Ok((v.iter().copied().collect::<BTreeSet<_>>(), bytes.len())));
        assert_eq!(from_slice(&bytes), Ok(([1u32, 300, 70000], bytes.len())));
        assert_eq!(from_slice::<[u32; 2]>(&bytes), Err(Error::ArityMismatch { expected: 2, found: 3 }));
        let empty: Vec<String> = Vec::new();
        assert_eq!(to_vec(&empty).unwrap(), [0x90]);
        let long: Vec<()> = vec![(); 16];
        let bytes = to_vec(&long).unwrap();
        assert_eq!(bytes[..3], [0xdc, 0x00, 0x10]);
        assert_eq!(from_slice(&bytes), Ok((long, 19)));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_hash_set() {
        let set: std::collections::HashSet<i8> = [-1i8, 5].into_iter().collect();
        let bytes = to_vec(&set).unwrap();
        assert_eq!(bytes.len(), 3);
        assert_eq!(bytes[0], 0x92);
        assert_eq!(from_slice(&bytes), Ok((set, 3)));
    }

    #[test]
    fn test_sequence_errors() {
        // declares 2^32-1 elements but ends early
        assert_eq!(from_slice::<Vec<u8>>(b"\xdd\xff\xff\xff\xff\x01"), Err(Error::UnexpectedEof));
        assert_eq!(from_slice::<Vec<u8>>(b"\x92\x01\xa0"), Err(Error::UnexpectedType {
            expected: MessagePackType::Integer, found: MessagePackType::String }));
        assert_eq!(from_slice::<Vec<u8>>(b"\x80"), Err(Error::UnexpectedType {
            expected: MessagePackType::Array, found: MessagePackType::Map }));
    }
}
