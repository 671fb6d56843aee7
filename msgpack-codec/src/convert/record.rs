//! Records: structures converted field by field.
//!
//! A record is either a positional array, where every field owns a slot at its
//! index, or a map from field names to values. [`RecordConverter`] writes the
//! shape selected by [`StructMode`](crate::StructMode), falling back to
//! [`Record::AS_ARRAY`], and reads both.
//!
//! Records are declared with the [`record!`](crate::record) macro, or by
//! implementing [`Record`] by hand:
//!
//! ```
//! use msgpack_codec::{Record, Writer, Reader, WriteTarget, ReadSource,
//!                     SerializerOptions, FieldDecl, Field, Result, resolve_fields};
//! use msgpack_codec::convert::{read_default, write_default};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Record for Point {
//!     const FIELDS: &'static [Field] = &resolve_fields([
//!         FieldDecl::new("x"),
//!         FieldDecl::new("y").with_index(3)
//!     ]);
//!
//!     async fn write_field<W: WriteTarget>(&self, position: usize, writer: &mut Writer<W>, options: &SerializerOptions) -> Result<()> {
//!         match position {
//!             0 => write_default(writer, &self.x, options).await,
//!             _ => write_default(writer, &self.y, options).await
//!         }
//!     }
//!
//!     async fn read_field<S: ReadSource>(&mut self, position: usize, reader: &mut Reader<S>, options: &SerializerOptions) -> Result<()> {
//!         match position {
//!             0 => self.x = read_default(reader, options).await?,
//!             _ => self.y = read_default(reader, options).await?
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut buf = [0u8; 8];
//! let len = msgpack_codec::to_slice_with::<_, msgpack_codec::RecordConverter<Point>>(
//!     &mut buf, &Point { x: 1, y: -1 }, &SerializerOptions::DEFAULT).unwrap();
//! assert_eq!(&buf[..len], b"\x94\x01\xc0\xc0\xff");
//! ```
use core::future::Future;
use core::marker::PhantomData;
use msgpack_io::{ReadSource, WriteTarget};
use tracing::trace;

use crate::{Reader, Writer, Result, MessagePackType, SerializerOptions};
use super::{Converter, skip_value};

/// A resolved record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The key in map mode
    pub name: &'static str,
    /// The slot in array mode
    pub index: u32,
    /// The field value is serialized
    pub readable: bool,
    /// Decoded values are stored into the field
    pub writable: bool
}

/// A field declaration, resolved into a [`Field`] by [`resolve_fields`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    name: &'static str,
    index: Option<u32>,
    readable: bool,
    writable: bool
}

impl FieldDecl {
    pub const fn new(name: &'static str) -> Self {
        FieldDecl { name, index: None, readable: true, writable: true }
    }

    pub const fn with_name(self, name: &'static str) -> Self {
        FieldDecl { name, ..self }
    }

    /// Place the field at `index`; following fields without an index continue from `index + 1`
    pub const fn with_index(self, index: u32) -> Self {
        FieldDecl { index: Some(index), ..self }
    }

    /// Never serialize the field, it is still decoded
    pub const fn skip_serializing(self) -> Self {
        FieldDecl { readable: false, ..self }
    }

    /// Never decode into the field, its slot or key is skipped
    pub const fn skip_deserializing(self) -> Self {
        FieldDecl { writable: false, ..self }
    }
}

/// Assign indices to declared fields in declaration order.
///
/// A field without an explicit index takes the index following the previous field's.
pub const fn resolve_fields<const N: usize>(decls: [FieldDecl; N]) -> [Field; N] {
    let mut fields = [Field { name: "", index: 0, readable: false, writable: false }; N];
    let mut next = 0;
    let mut i = 0;
    while i < N {
        let FieldDecl { name, index, readable, writable } = decls[i];
        let index = match index {
            Some(index) => index,
            None => next
        };
        next = index + 1;
        fields[i] = Field { name, index, readable, writable };
        i += 1;
    }
    fields
}

/// A structure with a static field table.
///
/// `position` arguments index [`Record::FIELDS`].
pub trait Record: Default {
    const FIELDS: &'static [Field];
    /// Array or map shape under [`StructMode::Auto`](crate::StructMode::Auto)
    const AS_ARRAY: bool = true;

    fn write_field<W: WriteTarget>(
        &self,
        position: usize,
        writer: &mut Writer<W>,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<()>>;

    fn read_field<S: ReadSource>(
        &mut self,
        position: usize,
        reader: &mut Reader<S>,
        options: &SerializerOptions
    ) -> impl Future<Output = Result<()>>;
}

/// Converter of [`Record`]s
#[derive(Debug, Clone, Copy)]
pub struct RecordConverter<R>(PhantomData<R>);

fn slot_count(fields: &[Field]) -> usize {
    fields.iter().map(|f| f.index as usize + 1).max().unwrap_or(0)
}

impl<R: Record> Converter<R> for RecordConverter<R> {
    async fn write<W: WriteTarget>(writer: &mut Writer<W>, value: &R, options: &SerializerOptions) -> Result<()> {
        let fields = R::FIELDS;
        if options.struct_as_array(R::AS_ARRAY) {
            let slots = slot_count(fields);
            writer.write_array_len(slots).await?;
            for slot in 0..slots {
                match fields.iter().position(|f| f.readable && f.index as usize == slot) {
                    Some(position) => value.write_field(position, writer, options).await?,
                    None => writer.write_nil().await?
                }
            }
        }
        else {
            writer.write_map_len(fields.iter().filter(|f| f.readable).count()).await?;
            for (position, field) in fields.iter().enumerate() {
                if field.readable {
                    writer.write_str(field.name).await?;
                    value.write_field(position, writer, options).await?;
                }
            }
        }
        Ok(())
    }

    async fn read<S: ReadSource>(reader: &mut Reader<S>, options: &SerializerOptions) -> Result<R> {
        let fields = R::FIELDS;
        let mut value = R::default();
        match reader.peek_type().await? {
            MessagePackType::Array => {
                let len = reader.read_array_len().await?.unwrap_or_default();
                for slot in 0..len {
                    match fields.iter().position(|f| f.writable && f.index as usize == slot) {
                        Some(position) => value.read_field(position, reader, options).await?,
                        None => {
                            trace!(slot, "skipping record slot");
                            skip_value(reader).await?
                        }
                    }
                }
            }
            MessagePackType::Map => {
                let len = reader.read_map_len().await?.unwrap_or_default();
                for _ in 0..len {
                    let key = reader.read_str_utf8_with(|key| {
                        fields.iter().position(|f| f.writable && f.name.as_bytes() == key)
                    }).await?;
                    match key {
                        Some(Some(position)) => value.read_field(position, reader, options).await?,
                        Some(None) => skip_value(reader).await?,
                        None => {
                            skip_value(reader).await?;
                            skip_value(reader).await?
                        }
                    }
                }
            }
            _ => return reader.unexpected(MessagePackType::Array).await
        }
        Ok(value)
    }
}
