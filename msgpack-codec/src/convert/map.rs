#[cfg(feature = "alloc")]
use alloc::collections::BTreeMap;
use core::marker::PhantomData;
use msgpack_io::{ReadSource, WriteTarget};

use crate::{Reader, Writer, Result, MessagePackType, SerializerOptions};
use super::{Converter, DefaultConverter, MAX_PREALLOC};

/// Converter of dictionaries written as maps, with `K` converting the keys
/// and `V` the values
#[derive(Debug, Clone, Copy)]
pub struct MapConverter<K, V>(PhantomData<(K, V)>);

async fn write_map<'a, W, K, V, KC, VC, I>(
        writer: &mut Writer<W>,
        len: usize,
        entries: I,
        options: &SerializerOptions
    ) -> Result<()>
    where W: WriteTarget, K: 'a, V: 'a, KC: Converter<K>, VC: Converter<V>,
          I: IntoIterator<Item = (&'a K, &'a V)>
{
    writer.write_map_len(len).await?;
    for (key, value) in entries {
        KC::write(writer, key, options).await?;
        VC::write(writer, value, options).await?;
    }
    Ok(())
}

async fn read_map<S, K, V, KC, VC, R>(
        reader: &mut Reader<S>,
        options: &SerializerOptions,
        init: impl FnOnce(usize) -> R,
        mut insert: impl FnMut(&mut R, K, V)
    ) -> Result<R>
    where S: ReadSource, KC: Converter<K>, VC: Converter<V>
{
    let Some(len) = reader.read_map_len().await? else {
        return reader.unexpected(MessagePackType::Map).await
    };
    let mut map = init(len.min(MAX_PREALLOC));
    for _ in 0..len {
        let key = KC::read(reader, options).await?;
        let value = VC::read(reader, options).await?;
        insert(&mut map, key, value);
    }
    Ok(map)
}

#[cfg(feature = "alloc")]
impl<K, V, KC, VC> Converter<BTreeMap<K, V>> for MapConverter<KC, VC>
    where K: Ord, KC: Converter<K>, VC: Converter<V>
{
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &BTreeMap<K, V>, options: &SerializerOptions) -> Result<()> {
        write_map::<W, K, V, KC, VC, _>(writer, value.len(), value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<BTreeMap<K, V>> {
        read_map::<S, K, V, KC, VC, BTreeMap<K, V>>(reader, options,
            |_| BTreeMap::new(),
            |map, key, value| { map.insert(key, value); }).await
    }
}

#[cfg(feature = "alloc")]
impl<K: DefaultConverter + Ord, V: DefaultConverter> DefaultConverter for BTreeMap<K, V> {
    type Converter = MapConverter<K::Converter, V::Converter>;
}

#[cfg(feature = "std")]
impl<K, V, H, KC, VC> Converter<std::collections::HashMap<K, V, H>> for MapConverter<KC, VC>
    where K: Eq + core::hash::Hash, H: core::hash::BuildHasher + Default, KC: Converter<K>, VC: Converter<V>
{
    async fn write<W: WriteTarget>(
            writer: &mut Writer<W>,
            value: &std::collections::HashMap<K, V, H>,
            options: &SerializerOptions
        ) -> Result<()>
    {
        write_map::<W, K, V, KC, VC, _>(writer, value.len(), value, options).await
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<std::collections::HashMap<K, V, H>> {
        read_map::<S, K, V, KC, VC, std::collections::HashMap<K, V, H>>(reader, options,
            |n| std::collections::HashMap::with_capacity_and_hasher(n, H::default()),
            |map, key, value| { map.insert(key, value); }).await
    }
}

#[cfg(feature = "std")]
impl<K, V, H> DefaultConverter for std::collections::HashMap<K, V, H>
    where K: DefaultConverter + Eq + core::hash::Hash, V: DefaultConverter,
          H: core::hash::BuildHasher + Default
{
    type Converter = MapConverter<K::Converter, V::Converter>;
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use alloc::{collections::BTreeMap, string::String, vec::Vec};
    use crate::*;

    #[test]
    fn test_btree_map() {
        let mut map = BTreeMap::new();
        map.insert(String::from("a"), 1u8);
        map.insert(String::from("b"), 2);
        let bytes = to_vec(&map).unwrap();
        assert_eq!(bytes, b"\x82\xa1a\x01\xa1b\x02");
        assert_eq!(from_slice(&bytes), Ok((map, 7)));
        let nested: BTreeMap<u8, Vec<u8>> = [(1, [2u8].into())].into_iter().collect();
        assert_eq!(to_vec(&nested).unwrap(), [0x81, 0x01, 0x91, 0x02]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_hash_map() {
        let map: std::collections::HashMap<i32, bool> = [(1, true), (-300, false)].into_iter().collect();
        let bytes = to_vec(&map).unwrap();
        assert_eq!(bytes[0], 0x82);
        assert_eq!(from_slice(&bytes), Ok((map, bytes.len())));
        assert_eq!(from_slice::<std::collections::HashMap<i32, bool>>(b"\x81\x01"), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_map_mismatch() {
        assert_eq!(from_slice::<BTreeMap<u8, u8>>(b"\x90"), Err(Error::UnexpectedType {
            expected: MessagePackType::Map, found: MessagePackType::Array }));
    }
}
