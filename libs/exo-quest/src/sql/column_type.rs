// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Engine-native column types.
///
/// The type decides how a literal is formatted, whether the engine can store a null for it,
/// and how a cell of that type is decoded from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    Decimal,
    Date,
    Timestamp,
    TimestampNs,
    Symbol,
    Varchar,
    String,
    Uuid,
    Ipv4,
    Binary,
    Long256,
    Geohash,
    Array,
}

impl ColumnType {
    /// The name the engine uses for this type in response metadata
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Byte => "BYTE",
            ColumnType::Short => "SHORT",
            ColumnType::Char => "CHAR",
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::Long => "LONG",
            ColumnType::Double => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampNs => "TIMESTAMP_NS",
            ColumnType::Symbol => "SYMBOL",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::String => "STRING",
            ColumnType::Uuid => "UUID",
            ColumnType::Ipv4 => "IPV4",
            ColumnType::Binary => "BINARY",
            ColumnType::Long256 => "LONG256",
            ColumnType::Geohash => "GEOHASH",
            ColumnType::Array => "ARRAY",
        }
    }

    /// Resolve a wire type name as reported in a response's column metadata.
    ///
    /// Parameterized names are recognized by shape: `GEOHASH(8c)`, `DECIMAL(18,3)`, and any
    /// `<ELEMENT>[]` array.
    pub fn from_wire_name(name: &str) -> Option<ColumnType> {
        let name = name.trim().to_ascii_uppercase();

        if name.ends_with("[]") {
            return Some(ColumnType::Array);
        }
        if name.starts_with("GEOHASH") {
            return Some(ColumnType::Geohash);
        }
        if name.starts_with("DECIMAL") {
            return Some(ColumnType::Decimal);
        }

        Some(match name.as_str() {
            "BOOLEAN" => ColumnType::Boolean,
            "BYTE" => ColumnType::Byte,
            "SHORT" => ColumnType::Short,
            "CHAR" => ColumnType::Char,
            "INT" => ColumnType::Int,
            "FLOAT" => ColumnType::Float,
            "LONG" => ColumnType::Long,
            "DOUBLE" => ColumnType::Double,
            "DATE" => ColumnType::Date,
            "TIMESTAMP" => ColumnType::Timestamp,
            "TIMESTAMP_NS" => ColumnType::TimestampNs,
            "SYMBOL" => ColumnType::Symbol,
            "VARCHAR" => ColumnType::Varchar,
            "STRING" => ColumnType::String,
            "UUID" => ColumnType::Uuid,
            "IPV4" => ColumnType::Ipv4,
            "BINARY" => ColumnType::Binary,
            "LONG256" => ColumnType::Long256,
            _ => return None,
        })
    }

    /// The engine stores no null for these; a missing value reads back as `false`/`0`.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            ColumnType::Boolean | ColumnType::Byte | ColumnType::Short
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Byte
                | ColumnType::Short
                | ColumnType::Int
                | ColumnType::Float
                | ColumnType::Long
                | ColumnType::Double
        )
    }

    /// Types that may serve as a designated timestamp
    pub fn is_timestamp(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::TimestampNs)
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(
            ColumnType::from_wire_name("TIMESTAMP"),
            Some(ColumnType::Timestamp)
        );
        assert_eq!(
            ColumnType::from_wire_name("timestamp_ns"),
            Some(ColumnType::TimestampNs)
        );
        assert_eq!(
            ColumnType::from_wire_name("GEOHASH(8c)"),
            Some(ColumnType::Geohash)
        );
        assert_eq!(
            ColumnType::from_wire_name("DOUBLE[]"),
            Some(ColumnType::Array)
        );
        assert_eq!(
            ColumnType::from_wire_name("DECIMAL(18,3)"),
            Some(ColumnType::Decimal)
        );
        assert_eq!(ColumnType::from_wire_name("INTERVAL"), None);
    }

    #[test]
    fn schema_names_round_trip_through_serde() {
        let parsed: Vec<ColumnType> =
            serde_json::from_str(r#"["timestamp_ns", "long256", "ipv4", "symbol"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                ColumnType::TimestampNs,
                ColumnType::Long256,
                ColumnType::Ipv4,
                ColumnType::Symbol
            ]
        );
    }
}
