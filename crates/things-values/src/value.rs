use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value as Json};

use crate::kind::ValueType;

/// An in-memory value of one of the supported [`ValueType`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Mixed(Json),
    Boolean(bool),
    Number(f64),
    Integer(i64),
    String(String),
    Array(Vec<Json>),
    Object(Map<String, Json>),
    Buffer(Vec<u8>),
    Percentage(f64),
    Duration(Duration),
}

impl Value {
    /// The type tag this value naturally carries.
    pub fn kind(&self) -> ValueType {
        match self {
            Self::Mixed(_) => ValueType::Mixed,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Number(_) => ValueType::Number,
            Self::Integer(_) => ValueType::Integer,
            Self::String(_) => ValueType::String,
            Self::Array(_) => ValueType::Array,
            Self::Object(_) => ValueType::Object,
            Self::Buffer(_) => ValueType::Buffer,
            Self::Percentage(_) => ValueType::Percentage,
            Self::Duration(_) => ValueType::Duration,
        }
    }

    /// Build a percentage, clamping into `0..=100`.
    pub fn percentage(value: f64) -> Self {
        Self::Percentage(clamp_percentage(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Mixed(Json::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of number-like values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) | Self::Percentage(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            Self::Mixed(Json::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Mixed(Json::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Mixed(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow the raw JSON of a `mixed` value.
    pub fn as_json(&self) -> Option<&Json> {
        match self {
            Self::Mixed(json) => Some(json),
            _ => None,
        }
    }
}

pub(crate) fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed(json) => write!(f, "{json}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => write!(f, "{}", Json::Array(items.clone())),
            Self::Object(map) => write!(f, "{}", Json::Object(map.clone())),
            Self::Buffer(bytes) => f.write_str(&hex::encode(bytes)),
            Self::Percentage(p) => write!(f, "{p}%"),
            Self::Duration(d) => f.write_str(&crate::duration::format_duration(*d)),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Self::Mixed(json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}
