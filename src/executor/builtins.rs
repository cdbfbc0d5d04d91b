//! Built-in function implementations.

use chrono::{Datelike, Timelike};

use crate::binder::BuiltinFunction;
use crate::error::{BindError, Result};
use crate::types::Value;

/// Applies a built-in function to present (non-null) arguments.
pub(crate) fn invoke(function: BuiltinFunction, args: &[Value]) -> Result<Value> {
    use BuiltinFunction as F;

    let value = match (function, args) {
        (F::Contains, [Value::String(s), Value::String(p)]) => Value::Bool(s.contains(p.as_str())),
        (F::StartsWith, [Value::String(s), Value::String(p)]) => {
            Value::Bool(s.starts_with(p.as_str()))
        }
        (F::EndsWith, [Value::String(s), Value::String(p)]) => Value::Bool(s.ends_with(p.as_str())),
        (F::Length, [Value::String(s)]) => int32(s.chars().count())?,
        (F::IndexOf, [Value::String(s), Value::String(p)]) => match s.find(p.as_str()) {
            Some(offset) => int32(s[..offset].chars().count())?,
            None => Value::Int32(-1),
        },
        (F::Substring, [Value::String(s), Value::Int32(start)]) => {
            Value::String(substring(s, *start, None))
        }
        (F::Substring, [Value::String(s), Value::Int32(start), Value::Int32(length)]) => {
            Value::String(substring(s, *start, Some(*length)))
        }
        (F::ToLower, [Value::String(s)]) => Value::String(s.to_lowercase()),
        (F::ToUpper, [Value::String(s)]) => Value::String(s.to_uppercase()),
        (F::Trim, [Value::String(s)]) => Value::String(s.trim().to_string()),
        (F::Concat, [Value::String(a), Value::String(b)]) => Value::String(format!("{a}{b}")),

        (F::Year, [Value::Date(d)]) => Value::Int32(d.year()),
        (F::Year, [Value::DateTimeOffset(d)]) => Value::Int32(d.year()),
        (F::Month, [Value::Date(d)]) => small(d.month()),
        (F::Month, [Value::DateTimeOffset(d)]) => small(d.month()),
        (F::Day, [Value::Date(d)]) => small(d.day()),
        (F::Day, [Value::DateTimeOffset(d)]) => small(d.day()),
        (F::Hour, [Value::DateTimeOffset(d)]) => small(d.hour()),
        (F::Minute, [Value::DateTimeOffset(d)]) => small(d.minute()),
        (F::Second, [Value::DateTimeOffset(d)]) => small(d.second()),
        (F::Date, [Value::DateTimeOffset(d)]) => Value::Date(d.date_naive()),

        (F::Round, [Value::Float64(f)]) => Value::Float64(f.round_ties_even()),
        (F::Round, [Value::Float32(f)]) => Value::Float32(f.round_ties_even()),
        (F::Floor, [Value::Float64(f)]) => Value::Float64(f.floor()),
        (F::Floor, [Value::Float32(f)]) => Value::Float32(f.floor()),
        (F::Ceiling, [Value::Float64(f)]) => Value::Float64(f.ceil()),
        (F::Ceiling, [Value::Float32(f)]) => Value::Float32(f.ceil()),

        _ => {
            return Err(BindError::Evaluation(format!(
                "Invalid arguments for '{}': {args:?}",
                function.name()
            )))
        }
    };
    Ok(value)
}

fn int32(n: usize) -> Result<Value> {
    i32::try_from(n)
        .map(Value::Int32)
        .map_err(|_| BindError::Evaluation(format!("Value {n} out of range for Int32")))
}

/// Calendar and clock components always fit.
fn small(n: u32) -> Value {
    Value::Int32(i32::try_from(n).unwrap_or(i32::MAX))
}

/// Character-based substring. A negative start counts as 0 and a negative
/// length as empty.
fn substring(s: &str, start: i32, length: Option<i32>) -> String {
    let start = usize::try_from(start).unwrap_or(0);
    let chars = s.chars().skip(start);
    match length {
        Some(length) => chars.take(usize::try_from(length).unwrap_or(0)).collect(),
        None => chars.collect(),
    }
}
