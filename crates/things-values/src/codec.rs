//! Conversion between [`Value`]s and their stored JSON form.
//!
//! Encoding is strict about shape but lenient about representation: a
//! `Value::String("5")` written as a `number` is stored as `5`. Decoding
//! applies the same narrowing rules to whatever document is on disk.

use std::time::Duration;

use serde_json::{Number, Value as Json};

use crate::duration::{millis_to_duration, parse_duration};
use crate::error::{ValueError, ValueResult};
use crate::kind::ValueType;
use crate::value::{clamp_percentage, Value};

/// Encode `value` as the JSON document stored for type `kind`.
pub fn to_json(kind: ValueType, value: &Value) -> ValueResult<Json> {
    let json = match kind {
        ValueType::Mixed => raw_json(value),
        ValueType::Buffer => match value {
            Value::Buffer(bytes) => Json::String(hex::encode(bytes)),
            other => Json::String(hex::encode(narrow_buffer(&raw_json(other))?)),
        },
        ValueType::Duration => match value {
            Value::Duration(d) => duration_json(*d),
            other => duration_json(narrow_duration(&raw_json(other))?),
        },
        _ => {
            let narrowed = narrow(kind, &raw_json(value))?;
            raw_json(&narrowed)
        }
    };
    Ok(json)
}

/// Decode a stored document as type `kind`.
///
/// `None` and JSON `null` both decode to `Ok(None)`.
pub fn from_json(kind: ValueType, json: Option<Json>) -> ValueResult<Option<Value>> {
    match json {
        None | Some(Json::Null) => Ok(None),
        Some(json) => narrow(kind, &json).map(Some),
    }
}

/// The natural JSON form of a value, independent of any target type.
fn raw_json(value: &Value) -> Json {
    match value {
        Value::Mixed(json) => json.clone(),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Number(n) | Value::Percentage(n) => float_json(*n),
        Value::Integer(i) => Json::from(*i),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.clone()),
        Value::Object(map) => Json::Object(map.clone()),
        Value::Buffer(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::Duration(d) => duration_json(*d),
    }
}

fn narrow(kind: ValueType, json: &Json) -> ValueResult<Value> {
    let value = match kind {
        ValueType::Mixed => Value::Mixed(json.clone()),
        ValueType::Boolean => Value::Boolean(narrow_bool(json)?),
        ValueType::Number => Value::Number(narrow_f64(kind, json)?),
        ValueType::Integer => Value::Integer(narrow_i64(json)?),
        ValueType::String => Value::String(narrow_string(json)?),
        ValueType::Array => match json {
            Json::Array(items) => Value::Array(items.clone()),
            Json::Object(_) => return Err(mismatch(kind, json)),
            scalar => Value::Array(vec![scalar.clone()]),
        },
        ValueType::Object => match json {
            Json::Object(map) => Value::Object(map.clone()),
            other => return Err(mismatch(kind, other)),
        },
        ValueType::Buffer => Value::Buffer(narrow_buffer(json)?),
        ValueType::Percentage => {
            let n = match json {
                Json::String(s) => {
                    let trimmed = s.trim();
                    trimmed
                        .strip_suffix('%')
                        .unwrap_or(trimmed)
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| mismatch(kind, json))?
                }
                other => narrow_f64(kind, other)?,
            };
            Value::Percentage(clamp_percentage(n))
        }
        ValueType::Duration => Value::Duration(narrow_duration(json)?),
    };
    Ok(value)
}

fn narrow_bool(json: &Json) -> ValueResult<bool> {
    match json {
        Json::Bool(b) => Ok(*b),
        Json::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(mismatch(ValueType::Boolean, json)),
        },
        other => Err(mismatch(ValueType::Boolean, other)),
    }
}

fn narrow_f64(kind: ValueType, json: &Json) -> ValueResult<f64> {
    match json {
        Json::Number(n) => n.as_f64().ok_or_else(|| mismatch(kind, json)),
        Json::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| mismatch(kind, json)),
        other => Err(mismatch(kind, other)),
    }
}

fn narrow_i64(json: &Json) -> ValueResult<i64> {
    if let Some(i) = json.as_i64() {
        return Ok(i);
    }
    let f = narrow_f64(ValueType::Integer, json)?;
    if f.trunc() < i64::MIN as f64 || f.trunc() > i64::MAX as f64 {
        return Err(mismatch(ValueType::Integer, json));
    }
    Ok(f.trunc() as i64)
}

fn narrow_string(json: &Json) -> ValueResult<String> {
    match json {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(b.to_string()),
        other => Err(mismatch(ValueType::String, other)),
    }
}

fn narrow_buffer(json: &Json) -> ValueResult<Vec<u8>> {
    match json {
        Json::String(s) => {
            hex::decode(s.trim()).map_err(|e| ValueError::InvalidBuffer(e.to_string()))
        }
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| mismatch(ValueType::Buffer, json))
            })
            .collect(),
        other => Err(mismatch(ValueType::Buffer, other)),
    }
}

fn narrow_duration(json: &Json) -> ValueResult<Duration> {
    match json {
        Json::Number(n) => n
            .as_f64()
            .and_then(millis_to_duration)
            .ok_or_else(|| mismatch(ValueType::Duration, json)),
        Json::String(s) => parse_duration(s),
        other => Err(mismatch(ValueType::Duration, other)),
    }
}

fn duration_json(d: Duration) -> Json {
    Json::from(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Whole floats are stored as integers so `5.0` round-trips as `5`.
fn float_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Json::from(n as i64)
    } else {
        Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

fn mismatch(expected: ValueType, found: &Json) -> ValueError {
    let found = match found {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("boolean {b}"),
        Json::Number(n) => format!("number {n}"),
        Json::String(s) => format!("string {s:?}"),
        Json::Array(items) => format!("array of {} items", items.len()),
        Json::Object(map) => format!("object with {} keys", map.len()),
    };
    ValueError::Mismatch { expected, found }
}
