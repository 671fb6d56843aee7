//! A MessagePack codec built from composable, zero-sized converters.
/*!
Values are encoded by a [`Converter`] driving a [`Writer`] and decoded by the
same converter driving a [`Reader`]. Converters for compound types are
generic over the converters of their parts, so the whole encoding of a type is
fixed at compile time.

The reader and the writer run over the [`ReadSource`] and [`WriteTarget`]
traits from [`msgpack_io`]. Every routine is written once: with in-memory
buffers and blocking streams it completes on the first poll, with the async
stream adapters it suspends while waiting for I/O.

[`DefaultConverter`] types:

| Rust type ->               | MessagePack type
|----------------------------|--------------------
| `()`                       | `nil`
| `bool`                     | `bool`
| `u8`-`u64`, `usize`        | `uint` (smallest representation)
| `i8`-`i64`, `isize`        | `int`, `uint` (sm. repr.)
| `f32`                      | `float-32`
| `f64`                      | `float-64`
| `char`, `String`           | `str`
| `u128`, `i128`             | `bin` with 16 big-endian bytes
| `Option<T>`                | `nil` or `T`
| `Box<T>`                   | `T`
| `Vec<T>`, sets, `[T; N]`   | `array` (sm. repr.)
| `BTreeMap`, `HashMap`      | `map` (sm. repr.)
| tuples                     | `array`, flattened when nested in the last slot
| records                    | `array` or `map` depending on [`StructMode`]
| [`MessagePackEnum`]        | `int` or `str` depending on [`EnumMode`]
| [`Timestamp`], `SystemTime`| `ext` -1 (timestamp)
| [`EmptyObject`]            | empty `array` or `map`

Byte blobs (`Vec<u8>`, `Box<[u8]>`) are written as `bin` with [`BytesConverter`];
`Vec<u8>` defaults to an array of integers like any other vector.

With the `uuid`, `rust_decimal` and `chrono` features, `Uuid`, `Decimal` and
`DateTime` get their converters too.
*/
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod macros;
mod error;
mod types;
pub mod value;
pub mod options;
pub mod de;
pub mod ser;
pub mod convert;

pub use msgpack_io;
pub use msgpack_io::{ReadSource, WriteTarget, SliceReader, SliceWriter};

pub use error::{Error, Result};
pub use types::MessagePackType;
pub use value::{DecodedInteger, DecodedFloat, Timestamp};
pub use options::{SerializerOptions, StructMode, EnumMode};
pub use de::Reader;
pub use ser::Writer;
pub use convert::{
    Converter,
    DefaultConverter,
    BytesConverter,
    EmptyObject,
    MessagePackEnum,
    record::{Record, RecordConverter, Field, FieldDecl, resolve_fields}
};

pub use ser::{to_slice, to_slice_with};
#[cfg(feature = "alloc")]
pub use ser::{to_vec, to_vec_with};
#[cfg(feature = "std")]
pub use ser::{to_writer, to_writer_with};
#[cfg(feature = "tokio")]
pub use ser::{to_async_writer, to_async_writer_with};

pub use de::{from_slice, from_slice_with};
#[cfg(feature = "std")]
pub use de::{from_reader, from_reader_with};
#[cfg(feature = "tokio")]
pub use de::{from_async_reader, from_async_reader_with};

mod magick {
    /* MessagePack MAGICK */
    pub const MIN_POSFIXINT: u8 = 0x00;
    pub const MAX_POSFIXINT: u8 = 0x7f;
    pub const NEGFIXINT: u8 = 0b11100000;
    pub const MIN_NEGFIXINT: i8 = NEGFIXINT as i8; //-32
    pub const NIL: u8      = 0xc0;
    pub const RESERVED: u8 = 0xc1;
    pub const FALSE: u8    = 0xc2;
    pub const TRUE: u8     = 0xc3;

    pub const FIXMAP: u8   = 0x80; /* 1000xxxx */
    pub const MAX_FIXMAP_SIZE: usize = 0b1111;
    pub const FIXMAP_MAX: u8 = FIXMAP + MAX_FIXMAP_SIZE as u8; /* 10001111 */

    pub const FIXARRAY: u8 = 0x90; /* 1001xxxx */
    pub const MAX_FIXARRAY_SIZE: usize = 0b1111;
    pub const FIXARRAY_MAX: u8 = FIXARRAY + MAX_FIXARRAY_SIZE as u8; /* 10011111 */

    pub const FIXSTR: u8   = 0xa0; /* 101xxxxx */
    pub const MAX_FIXSTR_SIZE: usize = 0b11111;
    pub const FIXSTR_MAX: u8 = FIXSTR + MAX_FIXSTR_SIZE as u8; /* 10111111 */

    pub const BIN_8: u8     = 0xc4;
    pub const BIN_16: u8    = 0xc5;
    pub const BIN_32: u8    = 0xc6;

    pub const EXT_8: u8     = 0xc7;
    pub const EXT_16: u8    = 0xc8;
    pub const EXT_32: u8    = 0xc9;

    pub const FLOAT_32: u8  = 0xca;
    pub const FLOAT_64: u8  = 0xcb;

    pub const UINT_8: u8    = 0xcc;
    pub const UINT_16: u8   = 0xcd;
    pub const UINT_32: u8   = 0xce;
    pub const UINT_64: u8   = 0xcf;

    pub const INT_8: u8     = 0xd0;
    pub const INT_16: u8    = 0xd1;
    pub const INT_32: u8    = 0xd2;
    pub const INT_64: u8    = 0xd3;

    pub const FIXEXT_1: u8  = 0xd4;
    pub const FIXEXT_2: u8  = 0xd5;
    pub const FIXEXT_4: u8  = 0xd6;
    pub const FIXEXT_8: u8  = 0xd7;
    pub const FIXEXT_16: u8 = 0xd8;

    pub const STR_8: u8     = 0xd9;
    pub const STR_16: u8    = 0xda;
    pub const STR_32: u8    = 0xdb;

    pub const ARRAY_16: u8  = 0xdc;
    pub const ARRAY_32: u8  = 0xdd;

    pub const MAP_16: u8    = 0xde;
    pub const MAP_32: u8    = 0xdf;

    /* extension types */
    pub const EXT_TIMESTAMP: i8 = -1;
    pub const TIMESTAMP_96_LEN: u8 = 12;
    /* 16-byte values: bin 8 + length */
    pub const BIN16_LEN: u8 = 16;
}

/// Drive a codec future to completion without an executor.
///
/// Sources and targets which never suspend complete on the first poll;
/// anything else is reported as [`Error::Pending`].
fn complete<T>(fut: impl core::future::Future<Output = Result<T>>) -> Result<T> {
    use futures::FutureExt;
    core::pin::pin!(fut).now_or_never().unwrap_or(Err(Error::Pending))
}
