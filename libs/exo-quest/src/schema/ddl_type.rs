// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{ColumnDescriptor, ColumnType, SqlError};

/// The type of a column as written in CREATE TABLE and ADD COLUMN.
pub fn ddl_type(column: &ColumnDescriptor) -> Result<String, SqlError> {
    let metadata = &column.metadata;

    match column.column_type {
        ColumnType::Symbol => {
            let mut ddl = "SYMBOL".to_string();
            if let Some(options) = &metadata.symbol {
                if let Some(capacity) = options.capacity {
                    ddl.push_str(&format!(" CAPACITY {capacity}"));
                }
                match options.cache {
                    Some(true) => ddl.push_str(" CACHE"),
                    Some(false) => ddl.push_str(" NOCACHE"),
                    None => {}
                }
                if options.index {
                    ddl.push_str(" INDEX");
                    if let Some(capacity) = options.index_capacity {
                        ddl.push_str(&format!(" CAPACITY {capacity}"));
                    }
                }
            }
            Ok(ddl)
        }
        ColumnType::Geohash => match metadata.geohash_bits {
            Some(bits) => Ok(format!("GEOHASH({bits}b)")),
            None => Err(SqlError::validation("GEOHASH columns need a precision (geohash_bits)")),
        },
        ColumnType::Array => match metadata.array_element {
            Some(element) => Ok(format!("{}[]", element.type_name())),
            None => Err(SqlError::validation("ARRAY columns need an element type (array_element)")),
        },
        // Nanosecond precision is carried by the values; the column type is TIMESTAMP
        ColumnType::TimestampNs => Ok("TIMESTAMP".to_string()),
        ColumnType::Boolean
        | ColumnType::Byte
        | ColumnType::Short
        | ColumnType::Char
        | ColumnType::Int
        | ColumnType::Float
        | ColumnType::Long
        | ColumnType::Double
        | ColumnType::Decimal
        | ColumnType::Date
        | ColumnType::Timestamp
        | ColumnType::Varchar
        | ColumnType::String
        | ColumnType::Uuid
        | ColumnType::Ipv4
        | ColumnType::Binary
        | ColumnType::Long256 => Ok(column.column_type.type_name().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolOptions;

    #[test]
    fn plain_types() {
        for (column_type, expected) in [
            (ColumnType::Boolean, "BOOLEAN"),
            (ColumnType::Int, "INT"),
            (ColumnType::Long256, "LONG256"),
            (ColumnType::Ipv4, "IPV4"),
            (ColumnType::Timestamp, "TIMESTAMP"),
            (ColumnType::TimestampNs, "TIMESTAMP"),
        ] {
            assert_eq!(
                ddl_type(&ColumnDescriptor::new(column_type)).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn symbols() {
        assert_eq!(ddl_type(&ColumnDescriptor::symbol()).unwrap(), "SYMBOL");

        let column = ColumnDescriptor::symbol_with(SymbolOptions {
            capacity: Some(128),
            cache: Some(false),
            index: true,
            index_capacity: Some(256),
        });
        assert_eq!(
            ddl_type(&column).unwrap(),
            "SYMBOL CAPACITY 128 NOCACHE INDEX CAPACITY 256"
        );

        let column = ColumnDescriptor::symbol_with(SymbolOptions {
            cache: Some(true),
            index: true,
            ..Default::default()
        });
        assert_eq!(ddl_type(&column).unwrap(), "SYMBOL CACHE INDEX");
    }

    #[test]
    fn parameterized_types() {
        assert_eq!(
            ddl_type(&ColumnDescriptor::geohash(40)).unwrap(),
            "GEOHASH(40b)"
        );
        assert_eq!(
            ddl_type(&ColumnDescriptor::array(ColumnType::Double)).unwrap(),
            "DOUBLE[]"
        );
        assert!(ddl_type(&ColumnDescriptor::new(ColumnType::Geohash)).is_err());
        assert!(ddl_type(&ColumnDescriptor::new(ColumnType::Array)).is_err());
    }
}
