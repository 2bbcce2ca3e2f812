use thiserror::Error;

use crate::kind::ValueType;

/// Errors produced while encoding or decoding typed values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The type tag is not one of the supported [`ValueType`]s.
    #[error("unknown value type: {0:?}")]
    UnknownType(String),

    /// A value could not be narrowed to the requested type.
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: ValueType, found: String },

    /// A textual duration could not be parsed.
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    /// A buffer string is not valid hex.
    #[error("invalid buffer encoding: {0}")]
    InvalidBuffer(String),
}

/// Result alias for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
