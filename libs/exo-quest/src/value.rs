// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};
use num_bigint::BigInt;

use crate::ColumnType;

/// A runtime value, used both for literals going into a statement and for cells decoded
/// out of a response.
///
/// Wide integers (`LONG`, `LONG256`, nanosecond epochs) are carried as [BigInt] so that
/// no value ever passes through a 53-bit float.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    /// A wire value passed through as is (arrays, geohashes and other non-string shapes)
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The column type a literal of this value gets when no declared type is available.
    pub fn inferred_type(&self) -> ColumnType {
        match self {
            Value::Bool(_) => ColumnType::Boolean,
            Value::Int(_) | Value::BigInt(_) => ColumnType::Long,
            Value::Float(_) => ColumnType::Double,
            Value::Timestamp(_) => ColumnType::Timestamp,
            Value::Binary(_) => ColumnType::Binary,
            Value::Array(_) => ColumnType::Array,
            Value::Null | Value::Text(_) | Value::Json(_) => ColumnType::Varchar,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::BigInt(i) => i64::try_from(i).ok(),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::BigInt(i) => Some(i.clone()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::BigInt(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Json(json) => write!(f, "{json}"),
        }
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(v.into())
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::BigInt(BigInt::from(v)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::BigInt(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v.and_utc())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(v.into_iter().map(Value::Float).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Array(v.into_iter().map(Value::Int).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_follows_value_shape() {
        assert_eq!(Value::from(true).inferred_type(), ColumnType::Boolean);
        assert_eq!(Value::from(42).inferred_type(), ColumnType::Long);
        assert_eq!(Value::from(u64::MAX).inferred_type(), ColumnType::Long);
        assert_eq!(Value::from(1.5).inferred_type(), ColumnType::Double);
        assert_eq!(
            Value::from(Utc::now()).inferred_type(),
            ColumnType::Timestamp
        );
        assert_eq!(Value::from("solar").inferred_type(), ColumnType::Varchar);
        assert_eq!(
            Value::from(vec![1.0, 2.0]).inferred_type(),
            ColumnType::Array
        );
    }

    #[test]
    fn u64_beyond_i64_becomes_big_int() {
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::BigInt(BigInt::from(u64::MAX)));
    }

    #[test]
    fn options_map_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
