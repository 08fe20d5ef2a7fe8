// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::{RawResponse, SqlError, Value, WithContext, coerce};

/// A decoded result row, keyed by column name in result order
pub type Row = IndexMap<String, Value>;

static MISSING_CELL: JsonValue = JsonValue::Null;

/// Decode the rows of a response, pairing cells with columns by position.
///
/// Responses without column metadata or rows (DDL and DML acknowledgements) yield no rows.
/// A row shorter than the column list reads the missing cells as null.
pub fn parse_rows(response: &RawResponse) -> Result<Vec<Row>, SqlError> {
    let (Some(columns), Some(rows)) = (&response.columns, &response.rows) else {
        return Ok(vec![]);
    };

    rows.iter()
        .enumerate()
        .map(|(row_index, cells)| {
            columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let cell = cells.get(index).unwrap_or(&MISSING_CELL);
                    coerce(cell, &column.wire_type)
                        .with_context(format!(
                            "while decoding column `{}` of row {row_index}",
                            column.name
                        ))
                        .map(|value| (column.name.clone(), value))
                })
                .collect()
        })
        .collect()
}
