// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Rendering of values and names into SQL text.
//!
//! The endpoint only accepts text, so this module is the single place where a runtime value
//! becomes SQL. Everything is decided by the declared [ColumnType]: numbers go out bare,
//! string-like values are single-quoted with quotes doubled, temporal values are quoted
//! ISO-8601 unless given as an epoch integer, and geohashes use the `##` prefix. Binary
//! values are always rejected.

use std::sync::LazyLock;

use chrono::SecondsFormat;
use num_bigint::{BigInt, Sign};
use regex::Regex;

use crate::{ColumnType, SqlError, Value};

pub const NULL: &str = "NULL";

static SAFE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static GEOHASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9b-hjkmnp-z]+$").unwrap());

// A count followed by one of the engine's time units (micros, millis, seconds, minutes,
// hours, days, weeks, months, years)
static DURATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[UTsmhdwMy]$").unwrap());

/// Format a value as an SQL literal of the given column type.
pub fn format_literal(value: &Value, column_type: ColumnType) -> Result<String, SqlError> {
    if value.is_null() {
        return Ok(NULL.to_string());
    }

    match column_type {
        ColumnType::Boolean => match value {
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(mismatch(value, column_type, "expected a boolean")),
        },
        ColumnType::Byte
        | ColumnType::Short
        | ColumnType::Int
        | ColumnType::Float
        | ColumnType::Long
        | ColumnType::Double => format_number(value, column_type),
        ColumnType::Long256 => match value {
            Value::BigInt(n) => {
                if n.sign() == Sign::Minus {
                    Err(mismatch(value, column_type, "LONG256 values are unsigned"))
                } else {
                    Ok(escape_string(&format!("0x{}", n.to_str_radix(16))))
                }
            }
            _ => format_string_like(value, column_type),
        },
        ColumnType::Varchar
        | ColumnType::String
        | ColumnType::Symbol
        | ColumnType::Uuid
        | ColumnType::Ipv4
        | ColumnType::Char
        | ColumnType::Decimal => format_string_like(value, column_type),
        ColumnType::Date | ColumnType::Timestamp | ColumnType::TimestampNs => {
            format_temporal(value, column_type)
        }
        ColumnType::Geohash => match value {
            Value::Text(hash) if GEOHASH.is_match(hash) => Ok(format!("##{hash}")),
            Value::Text(_) => Err(mismatch(
                value,
                column_type,
                "geohashes may only contain base-32 geohash characters",
            )),
            _ => Err(mismatch(value, column_type, "expected a geohash string")),
        },
        ColumnType::Binary => Err(SqlError::BinaryLiteral),
        ColumnType::Array => format_array(value),
    }
}

/// Escape an identifier (table, column, alias). Plain identifiers pass through unchanged,
/// anything else is double-quoted with embedded double quotes doubled.
pub fn escape_identifier(name: &str) -> String {
    if SAFE_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Wrap a string in single quotes, doubling any embedded single quote.
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Check a duration such as `1h` or `500T` (used by SAMPLE BY, join tolerances and table
/// parameters), since it is rendered unquoted.
pub(crate) fn validate_duration(what: &str, duration: &str) -> Result<(), SqlError> {
    if DURATION.is_match(duration) {
        Ok(())
    } else {
        Err(SqlError::validation(format!(
            "Invalid {what} `{duration}`: expected a count followed by one of U, T, s, m, h, d, w, M, y"
        )))
    }
}

fn format_number(value: &Value, column_type: ColumnType) -> Result<String, SqlError> {
    match value {
        Value::Int(i) => Ok(i.to_string()),
        Value::BigInt(i) => Ok(i.to_string()),
        Value::Float(f) => format_float(*f, value, column_type),
        _ => Err(mismatch(value, column_type, "expected a number")),
    }
}

fn format_float(f: f64, value: &Value, column_type: ColumnType) -> Result<String, SqlError> {
    if f.is_nan() {
        Ok("NaN".to_string())
    } else if f.is_infinite() {
        Err(mismatch(value, column_type, "infinite values have no literal"))
    } else {
        Ok(f.to_string())
    }
}

fn format_string_like(value: &Value, column_type: ColumnType) -> Result<String, SqlError> {
    let text = match value {
        Value::Text(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::Float(f) => format_float(*f, value, column_type)?,
        Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Micros, true),
        Value::Json(serde_json::Value::String(s)) => s.clone(),
        Value::Binary(_) => return Err(SqlError::BinaryLiteral),
        Value::Null | Value::Array(_) | Value::Json(_) => {
            return Err(mismatch(value, column_type, "expected a scalar value"));
        }
    };

    Ok(escape_string(&text))
}

fn format_temporal(value: &Value, column_type: ColumnType) -> Result<String, SqlError> {
    match value {
        Value::Timestamp(ts) => {
            let precision = if column_type == ColumnType::TimestampNs {
                SecondsFormat::Nanos
            } else {
                SecondsFormat::Micros
            };
            Ok(escape_string(&ts.to_rfc3339_opts(precision, true)))
        }
        // Epoch micros (or nanos) are accepted unquoted
        Value::Int(i) => Ok(i.to_string()),
        Value::BigInt(i) => Ok(i.to_string()),
        Value::Text(s) => Ok(escape_string(s)),
        _ => Err(mismatch(
            value,
            column_type,
            "expected a timestamp or an epoch integer",
        )),
    }
}

fn format_array(value: &Value) -> Result<String, SqlError> {
    let Value::Array(items) = value else {
        return Err(mismatch(value, ColumnType::Array, "expected a sequence of numbers"));
    };

    let elements = items
        .iter()
        .map(|item| match item {
            Value::Int(i) => Ok(i.to_string()),
            Value::BigInt(i) => Ok(BigInt::to_string(i)),
            Value::Float(f) => format_float(*f, item, ColumnType::Array),
            Value::Array(_) => Err(mismatch(
                value,
                ColumnType::Array,
                "nested arrays are not supported",
            )),
            _ => Err(mismatch(value, ColumnType::Array, "array elements must be numbers")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("{{{}}}", elements.join(",")))
}

fn mismatch(value: &Value, column_type: ColumnType, reason: &str) -> SqlError {
    SqlError::LiteralMismatch {
        column_type,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ALL_TYPES: [ColumnType; 21] = [
        ColumnType::Boolean,
        ColumnType::Byte,
        ColumnType::Short,
        ColumnType::Char,
        ColumnType::Int,
        ColumnType::Float,
        ColumnType::Long,
        ColumnType::Double,
        ColumnType::Decimal,
        ColumnType::Date,
        ColumnType::Timestamp,
        ColumnType::TimestampNs,
        ColumnType::Symbol,
        ColumnType::Varchar,
        ColumnType::String,
        ColumnType::Uuid,
        ColumnType::Ipv4,
        ColumnType::Binary,
        ColumnType::Long256,
        ColumnType::Geohash,
        ColumnType::Array,
    ];

    #[test]
    fn null_is_null_for_every_type() {
        for column_type in ALL_TYPES {
            assert_eq!(format_literal(&Value::Null, column_type).unwrap(), "NULL");
        }
    }

    #[test]
    fn booleans_and_numbers_are_bare() {
        assert_eq!(
            format_literal(&Value::Bool(true), ColumnType::Boolean).unwrap(),
            "true"
        );
        assert_eq!(
            format_literal(&Value::Int(-42), ColumnType::Int).unwrap(),
            "-42"
        );
        assert_eq!(
            format_literal(&Value::Float(1.25), ColumnType::Double).unwrap(),
            "1.25"
        );
        assert_eq!(
            format_literal(&Value::Float(f64::NAN), ColumnType::Double).unwrap(),
            "NaN"
        );
        assert!(format_literal(&Value::Float(f64::INFINITY), ColumnType::Double).is_err());
        assert!(format_literal(&Value::from("12"), ColumnType::Int).is_err());
    }

    #[test]
    fn wide_integers_keep_precision() {
        let big: BigInt = "9007199254740993".parse().unwrap();
        assert_eq!(
            format_literal(&Value::BigInt(big), ColumnType::Long).unwrap(),
            "9007199254740993"
        );

        let long256 = BigInt::parse_bytes(b"ffffffffffffffffffffffffffffffff01", 16).unwrap();
        assert_eq!(
            format_literal(&Value::BigInt(long256), ColumnType::Long256).unwrap(),
            "'0xffffffffffffffffffffffffffffffff01'"
        );
        assert!(format_literal(&Value::BigInt(BigInt::from(-1)), ColumnType::Long256).is_err());
    }

    #[test]
    fn strings_are_quoted_and_escaped() {
        assert_eq!(
            format_literal(&Value::from("it's"), ColumnType::Varchar).unwrap(),
            "'it''s'"
        );
        assert_eq!(
            format_literal(&Value::from("BTC-USD"), ColumnType::Symbol).unwrap(),
            "'BTC-USD'"
        );
        assert_eq!(
            format_literal(&Value::from("10.0.0.1"), ColumnType::Ipv4).unwrap(),
            "'10.0.0.1'"
        );
        assert_eq!(
            format_literal(&Value::Int(3), ColumnType::Decimal).unwrap(),
            "'3'"
        );
    }

    #[test]
    fn temporal_values() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            format_literal(&Value::Timestamp(ts), ColumnType::Timestamp).unwrap(),
            "'2026-01-15T10:30:00.000000Z'"
        );
        assert_eq!(
            format_literal(&Value::Timestamp(ts), ColumnType::TimestampNs).unwrap(),
            "'2026-01-15T10:30:00.000000000Z'"
        );
        assert_eq!(
            format_literal(&Value::Int(1768473000000000), ColumnType::Timestamp).unwrap(),
            "1768473000000000"
        );
        assert_eq!(
            format_literal(
                &Value::BigInt("1768473000000000123".parse().unwrap()),
                ColumnType::TimestampNs
            )
            .unwrap(),
            "1768473000000000123"
        );
        assert!(format_literal(&Value::Bool(true), ColumnType::Date).is_err());
    }

    #[test]
    fn geohash_uses_sentinel_prefix() {
        assert_eq!(
            format_literal(&Value::from("u33d"), ColumnType::Geohash).unwrap(),
            "##u33d"
        );
        assert!(format_literal(&Value::from("u33d' OR 1=1"), ColumnType::Geohash).is_err());
        assert!(format_literal(&Value::from("ua"), ColumnType::Geohash).is_err());
    }

    #[test]
    fn binary_always_fails() {
        assert!(matches!(
            format_literal(&Value::Binary(vec![1, 2, 3]), ColumnType::Binary),
            Err(SqlError::BinaryLiteral)
        ));
        assert!(matches!(
            format_literal(&Value::from("AQID"), ColumnType::Binary),
            Err(SqlError::BinaryLiteral)
        ));
    }

    #[test]
    fn arrays_are_strict() {
        assert_eq!(
            format_literal(&Value::from(vec![1.5, 2.0, -3.25]), ColumnType::Array).unwrap(),
            "{1.5,2,-3.25}"
        );
        assert_eq!(
            format_literal(&Value::Array(vec![]), ColumnType::Array).unwrap(),
            "{}"
        );
        assert!(format_literal(&Value::from("1,2"), ColumnType::Array).is_err());
        assert!(
            format_literal(
                &Value::Array(vec![Value::from(vec![1.0])]),
                ColumnType::Array
            )
            .is_err()
        );
        assert!(
            format_literal(&Value::Array(vec![Value::from("a")]), ColumnType::Array).is_err()
        );
    }

    #[test]
    fn identifiers() {
        assert_eq!(escape_identifier("trades"), "trades");
        assert_eq!(escape_identifier("_ts2"), "_ts2");
        assert_eq!(escape_identifier("2fast"), "\"2fast\"");
        assert_eq!(escape_identifier("order book"), "\"order book\"");
        assert_eq!(escape_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");

        // Quoting is not idempotent: a quoted name is itself not a plain identifier
        let once = escape_identifier("order book");
        assert_ne!(escape_identifier(&once), once);
        assert_eq!(escape_identifier(&escape_identifier("plain")), "plain");
    }

    #[test]
    fn durations() {
        assert!(validate_duration("interval", "1h").is_ok());
        assert!(validate_duration("interval", "15m").is_ok());
        assert!(validate_duration("interval", "500T").is_ok());
        assert!(validate_duration("interval", "1 hour").is_err());
        assert!(validate_duration("interval", "1h; DROP TABLE x").is_err());
        assert!(validate_duration("interval", "h").is_err());
    }
}
