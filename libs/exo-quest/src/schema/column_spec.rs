// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{ColumnType, SqlError};

/// Storage options of a SYMBOL column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    /// Expected number of distinct values
    pub capacity: Option<u32>,
    /// Whether the symbol table is cached in memory (`CACHE`/`NOCACHE`)
    pub cache: Option<bool>,
    pub index: bool,
    pub index_capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMetadata {
    /// The table's designated timestamp (time-ordering and partitioning key)
    pub designated: bool,
    pub symbol: Option<SymbolOptions>,
    /// Precision of a GEOHASH column in bits
    pub geohash_bits: Option<u8>,
    /// Element type of an ARRAY column
    pub array_element: Option<ColumnType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub metadata: ColumnMetadata,
}

impl ColumnDescriptor {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            metadata: ColumnMetadata::default(),
        }
    }

    pub fn designated_timestamp() -> Self {
        Self::new(ColumnType::Timestamp).designated()
    }

    pub fn symbol() -> Self {
        Self::new(ColumnType::Symbol)
    }

    pub fn symbol_with(options: SymbolOptions) -> Self {
        let mut column = Self::symbol();
        column.metadata.symbol = Some(options);
        column
    }

    pub fn geohash(bits: u8) -> Self {
        let mut column = Self::new(ColumnType::Geohash);
        column.metadata.geohash_bits = Some(bits);
        column
    }

    pub fn array(element: ColumnType) -> Self {
        let mut column = Self::new(ColumnType::Array);
        column.metadata.array_element = Some(element);
        column
    }

    pub fn designated(mut self) -> Self {
        self.metadata.designated = true;
        self
    }

    pub fn is_designated(&self) -> bool {
        self.metadata.designated
    }

    /// Check that the metadata fits the column type
    pub fn validate(&self, name: &str) -> Result<(), SqlError> {
        let column_type = self.column_type;
        let metadata = &self.metadata;

        if metadata.designated && !column_type.is_timestamp() {
            return Err(SqlError::validation(format!(
                "Column `{name}` of type {column_type} cannot be the designated timestamp"
            )));
        }
        if metadata.symbol.is_some() && column_type != ColumnType::Symbol {
            return Err(SqlError::validation(format!(
                "Column `{name}` of type {column_type} cannot have symbol options"
            )));
        }
        match (column_type, metadata.geohash_bits) {
            (ColumnType::Geohash, Some(bits)) if !(1..=60).contains(&bits) => {
                return Err(SqlError::validation(format!(
                    "Geohash column `{name}` must have between 1 and 60 bits, got {bits}"
                )));
            }
            (ColumnType::Geohash, _) | (_, None) => {}
            (_, Some(_)) => {
                return Err(SqlError::validation(format!(
                    "Column `{name}` of type {column_type} cannot have geohash bits"
                )));
            }
        }
        match (column_type, metadata.array_element) {
            (ColumnType::Array, Some(element)) if !element.is_numeric() => {
                return Err(SqlError::validation(format!(
                    "Array column `{name}` must have a numeric element type, got {element}"
                )));
            }
            (ColumnType::Array, _) | (_, None) => {}
            (_, Some(_)) => {
                return Err(SqlError::validation(format!(
                    "Column `{name}` of type {column_type} cannot have an array element type"
                )));
            }
        }

        Ok(())
    }
}
