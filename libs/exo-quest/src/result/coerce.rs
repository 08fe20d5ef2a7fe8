// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decoding of response cells into [Value]s, driven by the wire type of their column.

use std::ops::RangeInclusive;

use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};
use num_bigint::BigInt;
use serde_json::Value as JsonValue;

use crate::{ColumnType, SqlError, Value};

const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIME_FORMAT: &str = "%H:%M:%S%.f";

/// The epoch unit of a numeric temporal cell
#[derive(Clone, Copy)]
enum EpochUnit {
    Millis,
    Micros,
}

/// Decode a single cell given its column's wire type name.
///
/// Null decodes to [Value::Null] for every type. Unknown type names pass the cell through.
/// Malformed cells fail with [SqlError::Decode]; they are never replaced with a default.
pub fn coerce(cell: &JsonValue, wire_type: &str) -> Result<Value, SqlError> {
    if cell.is_null() {
        return Ok(Value::Null);
    }

    let Some(column_type) = ColumnType::from_wire_name(wire_type) else {
        return Ok(pass_through(cell));
    };

    match column_type {
        ColumnType::Timestamp => decode_timestamp(cell, wire_type, EpochUnit::Micros),
        ColumnType::Date => decode_timestamp(cell, wire_type, EpochUnit::Millis),
        ColumnType::TimestampNs => match cell {
            // Epoch nanos exceed what a float can hold exactly
            JsonValue::Number(number) => decode_big_int_text(&number.to_string(), cell, wire_type),
            JsonValue::String(text) if is_integer_text(text) => {
                decode_big_int_text(text, cell, wire_type)
            }
            _ => decode_timestamp(cell, wire_type, EpochUnit::Micros),
        },
        ColumnType::Long | ColumnType::Long256 => decode_big_int(cell, wire_type),
        ColumnType::Boolean => Ok(Value::Bool(is_truthy(cell))),
        ColumnType::Byte => decode_int(cell, wire_type, i8::MIN.into()..=i8::MAX.into()),
        ColumnType::Short => decode_int(cell, wire_type, i16::MIN.into()..=i16::MAX.into()),
        ColumnType::Int => decode_int(cell, wire_type, i32::MIN.into()..=i32::MAX.into()),
        ColumnType::Float | ColumnType::Double => decode_float(cell, wire_type),
        ColumnType::Binary => decode_binary(cell, wire_type),
        ColumnType::Char
        | ColumnType::Decimal
        | ColumnType::Symbol
        | ColumnType::Varchar
        | ColumnType::String
        | ColumnType::Uuid
        | ColumnType::Ipv4
        | ColumnType::Geohash
        | ColumnType::Array => Ok(pass_through(cell)),
    }
}

fn pass_through(cell: &JsonValue) -> Value {
    match cell {
        JsonValue::String(text) => Value::Text(text.clone()),
        other => Value::Json(other.clone()),
    }
}

fn decode_timestamp(cell: &JsonValue, wire_type: &str, unit: EpochUnit) -> Result<Value, SqlError> {
    match cell {
        JsonValue::String(text) => parse_timestamp(text)
            .map(Value::Timestamp)
            .ok_or_else(|| decode_error(cell, wire_type, "not an ISO-8601 timestamp")),
        JsonValue::Number(number) => {
            let epoch = number
                .as_i64()
                .ok_or_else(|| decode_error(cell, wire_type, "epoch is not an integer"))?;
            let timestamp = match unit {
                EpochUnit::Millis => DateTime::from_timestamp_millis(epoch),
                EpochUnit::Micros => DateTime::from_timestamp_micros(epoch),
            };
            timestamp
                .map(Value::Timestamp)
                .ok_or_else(|| decode_error(cell, wire_type, "epoch is out of range"))
        }
        _ => Err(decode_error(cell, wire_type, "expected a string or an epoch number")),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    // Try parsing as RFC3339 datetime first
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc));
    }

    // Try parsing as naive datetime with T separator, which is taken to be UTC
    NaiveDateTime::parse_from_str(text, &format!("{NAIVE_DATE_FORMAT}T{NAIVE_TIME_FORMAT}"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn decode_big_int(cell: &JsonValue, wire_type: &str) -> Result<Value, SqlError> {
    match cell {
        // With arbitrary precision, the number's text is exactly what the engine sent
        JsonValue::Number(number) => decode_big_int_text(&number.to_string(), cell, wire_type),
        JsonValue::String(text) => {
            let text = text.trim();
            match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16)
                    .map(Value::BigInt)
                    .ok_or_else(|| decode_error(cell, wire_type, "not a hexadecimal integer")),
                None => decode_big_int_text(text, cell, wire_type),
            }
        }
        _ => Err(decode_error(cell, wire_type, "expected an integer")),
    }
}

fn decode_big_int_text(text: &str, cell: &JsonValue, wire_type: &str) -> Result<Value, SqlError> {
    text.trim()
        .parse::<BigInt>()
        .map(Value::BigInt)
        .map_err(|_| decode_error(cell, wire_type, "not an integer"))
}

fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_truthy(cell: &JsonValue) -> bool {
    match cell {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn decode_int(
    cell: &JsonValue,
    wire_type: &str,
    range: RangeInclusive<i64>,
) -> Result<Value, SqlError> {
    let value = match cell {
        JsonValue::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    match value {
        Some(value) if range.contains(&value) => Ok(Value::Int(value)),
        Some(_) => Err(decode_error(
            cell,
            wire_type,
            format!("out of range {}..={}", range.start(), range.end()),
        )),
        None => Err(decode_error(cell, wire_type, "not an integer")),
    }
}

fn decode_float(cell: &JsonValue, wire_type: &str) -> Result<Value, SqlError> {
    let value = match cell {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .map(Value::Float)
        .ok_or_else(|| decode_error(cell, wire_type, "not a number"))
}

fn decode_binary(cell: &JsonValue, wire_type: &str) -> Result<Value, SqlError> {
    match cell {
        JsonValue::String(text) => base64::engine::general_purpose::STANDARD
            .decode(text)
            .map(Value::Binary)
            .map_err(|e| decode_error(cell, wire_type, e.to_string())),
        _ => Err(decode_error(cell, wire_type, "expected a base64 string")),
    }
}

fn decode_error(cell: &JsonValue, wire_type: &str, reason: impl Into<String>) -> SqlError {
    SqlError::Decode {
        wire_type: wire_type.to_string(),
        value: cell.to_string(),
        reason: reason.into(),
    }
}
