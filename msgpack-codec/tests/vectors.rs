#![cfg(any(feature = "std", feature = "alloc"))]
use std::collections::BTreeMap;

use msgpack_codec::*;
use msgpack_codec::convert::{SeqConverter, PrimitiveConverter};

#[derive(Debug, Default, PartialEq)]
struct IntField {
    a: i32
}

record!(IntField { a as "A" });

#[derive(Debug, Default, PartialEq)]
struct StrField {
    a: String
}

record!(StrField { a as "A" });

#[derive(Debug, Default, PartialEq)]
struct DictField {
    a: BTreeMap<i32, i32>
}

record!(DictField { a as "A" });

#[derive(Debug, Default, PartialEq)]
struct TwoFields {
    a: i32,
    b: f32
}

record!(TwoFields { a as "A", b as "B" });

type Nine = (u8, u8, u8, u8, u8, u8, u8, u8, u8);

#[derive(Debug, Default, PartialEq)]
struct TupleField {
    a: Nine
}

record!(TupleField { a as "A" });

#[derive(Debug, Default, PartialEq)]
struct Nested {
    a: i32,
    b: IntField
}

record!(Nested { a as "A", b as "B" });

fn round_trip<T: DefaultConverter + PartialEq + core::fmt::Debug>(value: T, expected: &[u8]) {
    let bytes = to_vec(&value).unwrap();
    assert_eq!(bytes, expected);
    assert_eq!(from_slice::<T>(expected).unwrap(), (value, expected.len()));
}

#[test]
fn record_vectors() {
    round_trip(IntField { a: 123 }, b"\x91\x7b");
    round_trip(StrField { a: "asd".into() }, b"\x91\xa3\x61\x73\x64");
    round_trip(DictField { a: [(1, 2)].into() }, b"\x91\x81\x01\x02");
    round_trip(TupleField { a: (1, 2, 3, 4, 5, 6, 7, 8, 9) },
               b"\x91\x99\x01\x02\x03\x04\x05\x06\x07\x08\x09");
    round_trip(Nested { a: 123, b: IntField { a: 456 } }, b"\x92\x7b\x91\xcd\x01\xc8");

    let options = SerializerOptions::DEFAULT.with_struct_mode(StructMode::AsMap);
    let value = TwoFields { a: 123, b: 456.0 };
    let expected = b"\x82\xa1\x41\x7b\xa1\x42\xca\x43\xe4\x00\x00";
    assert_eq!(to_vec_with::<_, RecordConverter<TwoFields>>(&value, &options).unwrap(), expected);
    assert_eq!(from_slice::<TwoFields>(expected).unwrap(), (value, expected.len()));
}

#[test]
fn scalar_vectors() {
    round_trip(123456u32, b"\xce\x00\x01\xe2\x40");
    round_trip(-123456i32, b"\xd2\xff\xfe\x1d\xc0");
    round_trip(123.456f64, b"\xcb\x40\x5e\xdd\x2f\x1a\x9f\xbe\x77");
}

#[cfg(feature = "uuid")]
#[test]
fn guid_vector() {
    let guid = uuid::Uuid::parse_str("5af5c532-4c91-4cd0-b541-15a405395fc5").unwrap();
    round_trip(guid, b"\xc4\x10\x5a\xf5\xc5\x32\x4c\x91\x4c\xd0\xb5\x41\x15\xa4\x05\x39\x5f\xc5");
}

macro_rules! test_integers {
    ($($ty:ty: $value:expr => $bytes:expr;)*) => {
        $(
            let bytes = to_vec(&($value as $ty)).unwrap();
            assert_eq!(bytes, $bytes, "{} as {}", $value, stringify!($ty));
            assert_eq!(from_slice::<$ty>(&bytes).unwrap(), ($value as $ty, bytes.len()));
            // every integer decodes into i64 as long as it fits
            assert_eq!(from_slice::<i64>(&bytes).unwrap(), ($value as i64, bytes.len()));
        )*
    };
}

#[test]
fn integer_boundaries() {
    test_integers! {
        i64: -33 => b"\xd0\xdf";
        i64: -32 => b"\xe0";
        i64: -1 => b"\xff";
        i64: 0 => b"\x00";
        i64: 127 => b"\x7f";
        i64: 128 => b"\xcc\x80";
        i64: 255 => b"\xcc\xff";
        i64: 256 => b"\xcd\x01\x00";
        i64: 65535 => b"\xcd\xff\xff";
        i64: 65536 => b"\xce\x00\x01\x00\x00";
        i64: -128 => b"\xd0\x80";
        i64: -129 => b"\xd1\xff\x7f";
        i64: -32768 => b"\xd1\x80\x00";
        i64: -32769 => b"\xd2\xff\xff\x7f\xff";
        i64: i32::MIN as i64 - 1 => b"\xd3\xff\xff\xff\xff\x7f\xff\xff\xff";
        u64: u32::MAX as u64 => b"\xce\xff\xff\xff\xff";
        u64: u32::MAX as u64 + 1 => b"\xcf\x00\x00\x00\x01\x00\x00\x00\x00";
        i8: -1 => b"\xff";
        u16: 128 => b"\xcc\x80";
        i32: 200 => b"\xcc\xc8";
    }
    assert_eq!(to_vec(&u64::MAX).unwrap(), b"\xcf\xff\xff\xff\xff\xff\xff\xff\xff");
    assert_eq!(from_slice::<i64>(b"\xcf\xff\xff\xff\xff\xff\xff\xff\xff"), Err(Error::IntegerOverflow));
}

#[test]
fn skip_once_consumes_encoded_values() {
    let mut map = BTreeMap::new();
    map.insert("list".to_string(), vec![Some(1.5f64), None]);
    map.insert("x".repeat(40), vec![]);
    let encodings = [
        to_vec(&map).unwrap(),
        to_vec(&Nested { a: -1, b: IntField { a: 70000 } }).unwrap(),
        to_vec(&(1u8, "two".to_string(), [3u16; 20], Timestamp::from_seconds(1 << 40))).unwrap(),
        to_vec_with::<_, SeqConverter<PrimitiveConverter>>(&vec![u128::MAX; 3], &SerializerOptions::DEFAULT).unwrap(),
        to_vec(&EmptyObject).unwrap(),
    ];
    for bytes in encodings {
        let mut input = bytes.clone();
        input.extend_from_slice(b"\xc0");
        let mut reader = Reader::new(SliceReader::new(&input));
        let skipped = futures_skip(&mut reader);
        assert_eq!(skipped, Ok(true));
        assert_eq!(reader.get_ref().position(), bytes.len());
    }
}

fn futures_skip(reader: &mut Reader<SliceReader<'_>>) -> Result<bool> {
    use futures::FutureExt;
    core::pin::pin!(reader.skip_once()).now_or_never().unwrap()
}
