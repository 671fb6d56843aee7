//! Serializer options.

/// Default limit for a single declared string, binary or extension length
pub const DEFAULT_MAX_LENGTH: usize = 64 * 1024 * 1024;

/// How records are laid out on the wire
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StructMode {
    /// Follow the record's own preference
    #[default]
    Auto,
    /// Positional array indexed by field index
    AsArray,
    /// Map of field names to values
    AsMap
}

/// How enums are laid out on the wire
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnumMode {
    /// Same as [`EnumMode::Number`] unless the converter says otherwise
    #[default]
    Auto,
    /// Underlying integer value
    Number,
    /// Variant name
    String
}

/// Options passed down to every converter.
///
/// With the `serde` feature the options can be loaded from configuration
/// files; missing fields take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerializerOptions {
    pub struct_mode: StructMode,
    pub enum_mode: EnumMode,
    /// Largest accepted declared length of a string, binary or extension
    pub max_length: usize
}

impl SerializerOptions {
    /// Shared default instance
    pub const DEFAULT: SerializerOptions = SerializerOptions::new();

    pub const fn new() -> Self {
        SerializerOptions {
            struct_mode: StructMode::Auto,
            enum_mode: EnumMode::Auto,
            max_length: DEFAULT_MAX_LENGTH
        }
    }

    pub const fn with_struct_mode(mut self, struct_mode: StructMode) -> Self {
        self.struct_mode = struct_mode;
        self
    }

    pub const fn with_enum_mode(mut self, enum_mode: EnumMode) -> Self {
        self.enum_mode = enum_mode;
        self
    }

    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Resolve [`StructMode::Auto`] against the record's preference
    pub const fn struct_as_array(&self, prefer_array: bool) -> bool {
        match self.struct_mode {
            StructMode::Auto => prefer_array,
            StructMode::AsArray => true,
            StructMode::AsMap => false
        }
    }

    /// Resolve [`EnumMode::Auto`] against the converter's preference
    pub const fn enum_as_string(&self, prefer_string: bool) -> bool {
        match self.enum_mode {
            EnumMode::Auto => prefer_string,
            EnumMode::Number => false,
            EnumMode::String => true
        }
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptions::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_resolve() {
        let opts = SerializerOptions::default();
        assert_eq!(opts, SerializerOptions::DEFAULT);
        assert!(opts.struct_as_array(true));
        assert!(!opts.struct_as_array(false));
        assert!(!opts.enum_as_string(false));
        let opts = opts.with_struct_mode(StructMode::AsMap).with_enum_mode(EnumMode::String);
        assert!(!opts.struct_as_array(true));
        assert!(opts.enum_as_string(false));
        assert_eq!(opts.with_max_length(10).max_length, 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_config() {
        let opts: SerializerOptions = serde_json::from_str(r#"{"struct_mode":"as_map"}"#).unwrap();
        assert_eq!(opts, SerializerOptions::DEFAULT.with_struct_mode(StructMode::AsMap));
        let opts: SerializerOptions = serde_json::from_str(
            r#"{"enum_mode":"string","max_length":1024}"#).unwrap();
        assert_eq!(opts.enum_mode, EnumMode::String);
        assert_eq!(opts.max_length, 1024);
        assert_eq!(opts.struct_mode, StructMode::Auto);
    }
}
