/// Declare an enum with integer discriminants and implement
/// [`MessagePackEnum`](crate::MessagePackEnum) for it.
///
/// The enum gets `#[repr]` of the given integer type and
/// [`EnumConverter`](crate::convert::EnumConverter) as its default converter.
/// The type must be `Copy`.
///
/// ```
/// msgpack_codec::msgpack_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     pub enum Status: u8 {
///         Active = 1,
///         Closed = 2
///     }
/// }
///
/// assert_eq!(msgpack_codec::to_vec(&Status::Closed).unwrap(), [0x02]);
/// ```
#[macro_export]
macro_rules! msgpack_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl $crate::MessagePackEnum for $name {
            type Repr = $repr;

            fn to_repr(self) -> $repr {
                self as $repr
            }

            fn from_repr(repr: $repr) -> ::core::option::Option<Self> {
                $(
                    if repr == $name::$variant as $repr {
                        return ::core::option::Option::Some($name::$variant)
                    }
                )*
                ::core::option::Option::None
            }

            fn name(self) -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(match self {
                    $($name::$variant => ::core::stringify!($variant)),*
                })
            }

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                $(
                    if name == ::core::stringify!($variant) {
                        return ::core::option::Option::Some($name::$variant)
                    }
                )*
                ::core::option::Option::None
            }
        }

        impl $crate::DefaultConverter for $name {
            type Converter = $crate::convert::EnumConverter<$name>;
        }
    };
}

/// Implement [`Record`](crate::Record) and the default converter for a structure.
///
/// Every listed field is converted with its type's default converter, unless
/// one is given after `=>`. A field can be renamed for map mode with
/// `as "name"` and placed at an explicit array slot with `@ index`.
/// The structure must implement `Default`, fields not present in the input keep
/// their default values. Records are arrays unless `#[as_map]` is given.
///
/// ```
/// use msgpack_codec::convert::BytesConverter;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Message {
///     id: u32,
///     body: Vec<u8>,
///     reply_to: Option<u32>
/// }
///
/// msgpack_codec::record!(Message {
///     id as "ID",
///     body => BytesConverter,
///     reply_to @ 5,
/// });
///
/// let msg = Message { id: 1, body: vec![0xff], reply_to: None };
/// let bytes = msgpack_codec::to_vec(&msg).unwrap();
/// assert_eq!(bytes, b"\x96\x01\xc4\x01\xff\xc0\xc0\xc0\xc0");
/// assert_eq!(msgpack_codec::from_slice(&bytes).unwrap(), (msg, bytes.len()));
/// ```
#[macro_export]
macro_rules! record {
    (@impl $as_array:literal, $name:ident {
        $($field:ident $(as $wire:literal)? $(@ $index:literal)? $(=> $conv:ty)?),* $(,)?
    }) => {
        impl $crate::Record for $name {
            const FIELDS: &'static [$crate::Field] = &$crate::resolve_fields([
                $($crate::FieldDecl::new(::core::stringify!($field))
                    $(.with_name($wire))?
                    $(.with_index($index))?),*
            ]);
            const AS_ARRAY: bool = $as_array;

            #[allow(unused_assignments, unused_mut, unused_variables)]
            async fn write_field<W: $crate::WriteTarget>(
                &self,
                position: usize,
                writer: &mut $crate::Writer<W>,
                options: &$crate::SerializerOptions
            ) -> $crate::Result<()>
            {
                let mut current = 0usize;
                $(
                    if position == current {
                        return $crate::__record_field!(write, writer, &self.$field, options $(, $conv)?)
                    }
                    current += 1;
                )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            async fn read_field<S: $crate::ReadSource>(
                &mut self,
                position: usize,
                reader: &mut $crate::Reader<S>,
                options: &$crate::SerializerOptions
            ) -> $crate::Result<()>
            {
                let mut current = 0usize;
                $(
                    if position == current {
                        self.$field = $crate::__record_field!(read, reader, options, &self.$field $(, $conv)?)?;
                        return ::core::result::Result::Ok(())
                    }
                    current += 1;
                )*
                ::core::result::Result::Ok(())
            }
        }

        impl $crate::DefaultConverter for $name {
            type Converter = $crate::RecordConverter<$name>;
        }
    };
    (#[as_map] $name:ident { $($body:tt)* }) => {
        $crate::record!(@impl false, $name { $($body)* });
    };
    ($name:ident { $($body:tt)* }) => {
        $crate::record!(@impl true, $name { $($body)* });
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_field {
    (write, $writer:ident, $value:expr, $options:ident) => {
        $crate::convert::write_default($writer, $value, $options).await
    };
    (write, $writer:ident, $value:expr, $options:ident, $conv:ty) => {
        <$conv as $crate::Converter<_>>::write($writer, $value, $options).await
    };
    (read, $reader:ident, $options:ident, $slot:expr) => {
        $crate::convert::read_default($reader, $options).await
    };
    (read, $reader:ident, $options:ident, $slot:expr, $conv:ty) => {
        $crate::convert::__read_as::<$conv, _, _>($slot, $reader, $options).await
    };
}
