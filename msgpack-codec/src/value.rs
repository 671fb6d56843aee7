//! Decoded numbers and timestamps.

/// An integer as it was found on the wire.
///
/// The variant records the width and signedness of the encoding. Positive
/// fixints decode as `U8`, negative fixints as `I8`. `None` means the next
/// value was not an integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodedInteger {
    #[default]
    None,
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64)
}

macro_rules! impl_integer_accessors {
    ($($ty:ident: $to:ident, $try_to:ident, $checked:ident;)*) => {
        impl DecodedInteger {$(
            #[doc = concat!("Cast to `", stringify!($ty), "`, truncating wider values. `None` casts to `0`.")]
            #[allow(clippy::unnecessary_cast)]
            pub const fn $to(self) -> $ty {
                match self {
                    DecodedInteger::None => 0,
                    DecodedInteger::U8(v) => v as $ty,
                    DecodedInteger::U16(v) => v as $ty,
                    DecodedInteger::U32(v) => v as $ty,
                    DecodedInteger::U64(v) => v as $ty,
                    DecodedInteger::I8(v) => v as $ty,
                    DecodedInteger::I16(v) => v as $ty,
                    DecodedInteger::I32(v) => v as $ty,
                    DecodedInteger::I64(v) => v as $ty,
                }
            }

            #[doc = concat!("Like [`DecodedInteger::", stringify!($to), "`] but return `None` when nothing was decoded.")]
            pub const fn $try_to(self) -> Option<$ty> {
                match self {
                    DecodedInteger::None => None,
                    v => Some(v.$to())
                }
            }

            #[doc = concat!("Convert to `", stringify!($ty), "` only when the value fits.")]
            pub fn $checked(self) -> Option<$ty> {
                match self {
                    DecodedInteger::None => None,
                    DecodedInteger::U8(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::U16(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::U32(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::U64(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::I8(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::I16(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::I32(v) => <$ty>::try_from(v).ok(),
                    DecodedInteger::I64(v) => <$ty>::try_from(v).ok(),
                }
            }
        )*}
    };
}

impl_integer_accessors! {
    u8: to_u8, try_to_u8, checked_u8;
    u16: to_u16, try_to_u16, checked_u16;
    u32: to_u32, try_to_u32, checked_u32;
    u64: to_u64, try_to_u64, checked_u64;
    usize: to_usize, try_to_usize, checked_usize;
    i8: to_i8, try_to_i8, checked_i8;
    i16: to_i16, try_to_i16, checked_i16;
    i32: to_i32, try_to_i32, checked_i32;
    i64: to_i64, try_to_i64, checked_i64;
    isize: to_isize, try_to_isize, checked_isize;
}

impl DecodedInteger {
    /// Return `true` when nothing was decoded
    pub const fn is_none(&self) -> bool {
        matches!(self, DecodedInteger::None)
    }
    /// Return the exact value, or `None` when nothing was decoded
    pub const fn to_i128(self) -> Option<i128> {
        Some(match self {
            DecodedInteger::None => return None,
            DecodedInteger::U8(v) => v as i128,
            DecodedInteger::U16(v) => v as i128,
            DecodedInteger::U32(v) => v as i128,
            DecodedInteger::U64(v) => v as i128,
            DecodedInteger::I8(v) => v as i128,
            DecodedInteger::I16(v) => v as i128,
            DecodedInteger::I32(v) => v as i128,
            DecodedInteger::I64(v) => v as i128,
        })
    }
}

macro_rules! impl_from_int {
    ($($ty:ty => $variant:ident),*) => {$(
        impl From<$ty> for DecodedInteger {
            fn from(v: $ty) -> Self {
                DecodedInteger::$variant(v)
            }
        }
    )*};
}

impl_from_int!(u8 => U8, u16 => U16, u32 => U32, u64 => U64,
               i8 => I8, i16 => I16, i32 => I32, i64 => I64);

/// A float as it was found on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum DecodedFloat {
    #[default]
    None,
    F32(f32),
    F64(f64)
}

impl DecodedFloat {
    pub const fn is_none(&self) -> bool {
        matches!(self, DecodedFloat::None)
    }
    /// `F64` is rounded, `None` casts to `0.0`
    pub const fn to_f32(self) -> f32 {
        match self {
            DecodedFloat::None => 0.0,
            DecodedFloat::F32(v) => v,
            DecodedFloat::F64(v) => v as f32
        }
    }
    /// `None` casts to `0.0`
    pub const fn to_f64(self) -> f64 {
        match self {
            DecodedFloat::None => 0.0,
            DecodedFloat::F32(v) => v as f64,
            DecodedFloat::F64(v) => v
        }
    }
    pub const fn try_to_f32(self) -> Option<f32> {
        match self {
            DecodedFloat::None => None,
            v => Some(v.to_f32())
        }
    }
    pub const fn try_to_f64(self) -> Option<f64> {
        match self {
            DecodedFloat::None => None,
            v => Some(v.to_f64())
        }
    }
}

impl From<f32> for DecodedFloat {
    fn from(v: f32) -> Self {
        DecodedFloat::F32(v)
    }
}

impl From<f64> for DecodedFloat {
    fn from(v: f64) -> Self {
        DecodedFloat::F64(v)
    }
}

/// A point in time as stored by the MessagePack timestamp extension.
///
/// `seconds` count from the Unix epoch and may be negative; `nanos` is
/// always below one billion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32
}

/// Nanoseconds in a second
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

impl Timestamp {
    /// The Unix epoch
    pub const UNIX_EPOCH: Timestamp = Timestamp { seconds: 0, nanos: 0 };

    /// Create new instance, return `None` if `nanos` is not below one billion
    pub const fn new(seconds: i64, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SEC {
            return None
        }
        Some(Timestamp { seconds, nanos })
    }

    pub const fn from_seconds(seconds: i64) -> Self {
        Timestamp { seconds, nanos: 0 }
    }

    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn nanos(&self) -> u32 {
        self.nanos
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl From<std::time::SystemTime> for Timestamp {
    fn from(time: std::time::SystemTime) -> Self {
        use std::time::UNIX_EPOCH;
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp {
                seconds: after.as_secs() as i64,
                nanos: after.subsec_nanos()
            },
            Err(err) => {
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanos = before.subsec_nanos();
                if nanos != 0 {
                    seconds -= 1;
                    nanos = NANOS_PER_SEC - nanos;
                }
                Timestamp { seconds, nanos }
            }
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl From<Timestamp> for std::time::SystemTime {
    fn from(ts: Timestamp) -> Self {
        use std::time::{Duration, UNIX_EPOCH};
        if ts.seconds >= 0 {
            UNIX_EPOCH + Duration::new(ts.seconds as u64, ts.nanos)
        }
        else {
            UNIX_EPOCH - Duration::from_secs(ts.seconds.unsigned_abs()) + Duration::from_nanos(ts.nanos.into())
        }
    }
}

#[cfg(feature = "chrono")]
#[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Timestamp {
    fn from(time: chrono::DateTime<Tz>) -> Self {
        // leap seconds are folded into the last nanosecond
        let nanos = time.timestamp_subsec_nanos().min(NANOS_PER_SEC - 1);
        Timestamp { seconds: time.timestamp(), nanos }
    }
}

#[cfg(feature = "chrono")]
#[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
impl TryFrom<Timestamp> for chrono::DateTime<chrono::Utc> {
    type Error = crate::Error;
    fn try_from(ts: Timestamp) -> crate::Result<Self> {
        chrono::DateTime::from_timestamp(ts.seconds, ts.nanos)
            .ok_or(crate::Error::InvalidValue("date-time out of range"))
    }
}
