//! Typed values for abstract-things storage.
//!
//! Stored values are plain JSON on disk. A [`ValueType`] tag decides how a
//! JSON document is narrowed into an in-memory [`Value`] on read, and how a
//! [`Value`] is encoded on write.
//!
//! # Key Types
//!
//! - [`ValueType`] — closed set of type tags; `mixed` is the untyped default
//! - [`Value`] — an in-memory value of one of those types
//! - [`to_json`] / [`from_json`] — the codec pair used at the storage boundary
//!
//! Absent values stay absent: [`from_json`] maps both a missing document and
//! JSON `null` to `Ok(None)` for every type.

pub mod codec;
pub mod duration;
pub mod error;
pub mod kind;
pub mod value;

pub use codec::{from_json, to_json};
pub use duration::{format_duration, parse_duration};
pub use error::{ValueError, ValueResult};
pub use kind::ValueType;
pub use value::Value;
