use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Type tag controlling how a stored value is encoded and narrowed.
///
/// The set is closed. [`ValueType::Mixed`] is the default and stores any
/// JSON document untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Any JSON document, passed through as-is.
    #[default]
    Mixed,
    Boolean,
    /// A floating point number.
    Number,
    /// A whole number.
    Integer,
    String,
    Array,
    Object,
    /// Raw bytes, encoded as a lowercase hex string.
    Buffer,
    /// A number clamped to `0..=100`.
    Percentage,
    /// A time span, encoded as whole milliseconds.
    Duration,
}

impl ValueType {
    /// Every supported tag, in declaration order.
    pub const ALL: [ValueType; 10] = [
        ValueType::Mixed,
        ValueType::Boolean,
        ValueType::Number,
        ValueType::Integer,
        ValueType::String,
        ValueType::Array,
        ValueType::Object,
        ValueType::Buffer,
        ValueType::Percentage,
        ValueType::Duration,
    ];

    /// The canonical tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Buffer => "buffer",
            Self::Percentage => "percentage",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = ValueError;

    /// Parse a tag name, ignoring ASCII case. A few common aliases
    /// (`bool`, `int`, `bytes`, ...) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "mixed" => Self::Mixed,
            "boolean" | "bool" => Self::Boolean,
            "number" => Self::Number,
            "integer" | "int" => Self::Integer,
            "string" => Self::String,
            "array" => Self::Array,
            "object" => Self::Object,
            "buffer" | "bytes" => Self::Buffer,
            "percentage" | "percent" => Self::Percentage,
            "duration" => Self::Duration,
            _ => return Err(ValueError::UnknownType(s.to_string())),
        };
        Ok(kind)
    }
}
