use core::fmt;
use crate::magick::*;

/// The logical type of the next encoded value, derived from its tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessagePackType {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Binary,
    Array,
    Map,
    Extension,
    /// No more input, or a tag that encodes no value
    Eof
}

impl MessagePackType {
    /// Classify a tag byte.
    ///
    /// The reserved tag `0xc1` classifies as [`MessagePackType::Eof`].
    pub const fn from_tag(tag: u8) -> Self {
        use MessagePackType::*;
        match tag {
            MIN_POSFIXINT..=MAX_POSFIXINT|
            NEGFIXINT..=0xff|
            UINT_8..=UINT_64|
            INT_8..=INT_64 => Integer,
            FIXMAP..=FIXMAP_MAX|MAP_16|MAP_32 => Map,
            FIXARRAY..=FIXARRAY_MAX|ARRAY_16|ARRAY_32 => Array,
            FIXSTR..=FIXSTR_MAX|STR_8..=STR_32 => String,
            NIL => Nil,
            FALSE|TRUE => Boolean,
            BIN_8..=BIN_32 => Binary,
            EXT_8..=EXT_32|FIXEXT_1..=FIXEXT_16 => Extension,
            FLOAT_32|FLOAT_64 => Float,
            RESERVED => Eof
        }
    }
}

impl fmt::Display for MessagePackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MessagePackType::*;
        f.write_str(match self {
            Nil => "nil",
            Boolean => "bool",
            Integer => "int",
            Float => "float",
            String => "str",
            Binary => "bin",
            Array => "array",
            Map => "map",
            Extension => "ext",
            Eof => "end of input"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MessagePackType::*;

    #[test]
    fn test_from_tag() {
        let mut counts = [0usize; 10];
        for tag in 0..=255u8 {
            let typ = MessagePackType::from_tag(tag);
            counts[typ as usize] += 1;
        }
        // nil bool int float str bin array map ext eof
        assert_eq!(counts, [1, 2, 128 + 32 + 8, 2, 32 + 3, 3, 16 + 2, 16 + 2, 3 + 5, 1]);
        macro_rules! test_tags {
            ($($tag:expr => $typ:expr),* $(,)?) => {$(
                assert_eq!(MessagePackType::from_tag($tag), $typ, "tag {:#04x}", $tag);
            )*};
        }
        test_tags! {
            0x00 => Integer, 0x7f => Integer, 0xe0 => Integer, 0xff => Integer,
            0x80 => Map, 0x8f => Map, 0x90 => Array, 0x9f => Array,
            0xa0 => String, 0xbf => String, 0xc0 => Nil, 0xc1 => Eof,
            0xc2 => Boolean, 0xc3 => Boolean, 0xc4 => Binary, 0xc6 => Binary,
            0xc7 => Extension, 0xc9 => Extension, 0xca => Float, 0xcb => Float,
            0xcc => Integer, 0xd3 => Integer, 0xd4 => Extension, 0xd8 => Extension,
            0xd9 => String, 0xdb => String, 0xdc => Array, 0xdd => Array,
            0xde => Map, 0xdf => Map,
        }
    }
}
