use core::fmt;
use core::str::Utf8Error;
use msgpack_io::IoError;

use crate::MessagePackType;

/// Codec result
pub type Result<T> = core::result::Result<T, Error>;

/// Codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An error from the read source or the write target
    Io(IoError),
    /// EOF while parsing
    UnexpectedEof,
    /// Reserved code was detected
    ReservedCode,
    /// The next value is not of the type a converter expects
    UnexpectedType {
        expected: MessagePackType,
        found: MessagePackType
    },
    /// Number could not be coerced without loss
    IntegerOverflow,
    /// Invalid UTF-8 in a string
    InvalidUtf8,
    /// Malformed timestamp extension
    InvalidTimestamp,
    /// Binary payload of an unexpected length
    InvalidBinaryLength,
    /// An array of a different length than expected
    ArityMismatch {
        expected: usize,
        found: usize
    },
    /// A declared length exceeds the configured limit
    LengthLimit {
        declared: u64,
        limit: usize
    },
    /// Neither a variant name nor a variant value
    UnknownVariant,
    /// A value that does not fit the decoded type
    InvalidValue(&'static str),
    /// A blocking entry point met a source or target which would suspend
    Pending
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "MessagePack I/O: {}", err),
            Error::UnexpectedEof => f.write_str("Unexpected end of MessagePack input"),
            Error::ReservedCode => f.write_str("Reserved MessagePack code in input"),
            Error::UnexpectedType { expected, found } => {
                write!(f, "Expected MessagePack {}, found {}", expected, found)
            }
            Error::IntegerOverflow => f.write_str("Could not coerce integer to a decoded type"),
            Error::InvalidUtf8 => f.write_str("Invalid UTF-8 in MessagePack string"),
            Error::InvalidTimestamp => f.write_str("Invalid MessagePack timestamp"),
            Error::InvalidBinaryLength => f.write_str("Invalid MessagePack bin length"),
            Error::ArityMismatch { expected, found } => {
                write!(f, "Expected {} elements, found {}", expected, found)
            }
            Error::LengthLimit { declared, limit } => {
                write!(f, "Declared length {} exceeds the limit of {}", declared, limit)
            }
            Error::UnknownVariant => f.write_str("Unknown enum variant"),
            Error::InvalidValue(what) => write!(f, "Invalid {}", what),
            Error::Pending => f.write_str("I/O would block in a blocking call"),
        }
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::UnexpectedEof => Error::UnexpectedEof,
            err => Error::Io(err)
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(_err: Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
