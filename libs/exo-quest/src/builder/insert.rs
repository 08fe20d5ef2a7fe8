// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ColumnType, ExpressionBuilder, InsertCell, InsertNode, RawResponse, SqlError,
    TableDescriptor, Transport, Value, format_literal,
};

/// The SQL a designated timestamp gets when a row leaves it out
const CURRENT_TIMESTAMP: &str = "now()";

/// What an absent or null cell of a column the engine cannot store null in reads back as
fn non_null_default(column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Boolean => Value::Bool(false),
        _ => Value::Int(0),
    }
}

/// The cells of one row, by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertRow {
    cells: IndexMap<String, InsertCell>,
}

impl InsertRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells
            .insert(column.into(), InsertCell::Value(value.into()));
        self
    }

    /// Set a cell to SQL emitted verbatim, such as a function call
    pub fn set_raw(mut self, column: impl Into<String>, sql: impl Into<String>) -> Self {
        self.cells
            .insert(column.into(), InsertCell::Raw(sql.into()));
        self
    }
}

/// Accumulates rows for a multi-row INSERT into one table.
///
/// The column list covers every column some row sets, in the table's declaration order,
/// plus the designated timestamp. A row that leaves the designated timestamp out gets the
/// engine's current time. Any other column it leaves out is NULL, or `false`/`0` for the
/// types that have no null.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Arc<TableDescriptor>,
    rows: Vec<InsertRow>,
}

impl InsertBuilder {
    pub fn new(table: &Arc<TableDescriptor>) -> Self {
        Self {
            table: table.clone(),
            rows: vec![],
        }
    }

    /// Add a row. Empty rows, unknown columns, a null designated timestamp and values that do
    /// not fit their column's type are rejected here, leaving the builder unchanged.
    pub fn row(&mut self, row: InsertRow) -> Result<&mut Self, SqlError> {
        if row.cells.is_empty() {
            return Err(SqlError::validation(format!(
                "A row inserted into {} must set at least one column",
                self.table.name()
            )));
        }

        let designated = self.table.designated_timestamp();
        for (name, cell) in &row.cells {
            let column = self.table.column(name).ok_or_else(|| {
                SqlError::validation(format!(
                    "Column {name} is not a column of {}",
                    self.table.name()
                ))
            })?;

            if let InsertCell::Value(value) = cell {
                if value.is_null() && Some(name.as_str()) == designated {
                    return Err(SqlError::validation(format!(
                        "The designated timestamp {name} of {} cannot be null; leave it out to \
                         insert the current time",
                        self.table.name()
                    )));
                }
                format_literal(value, column.column_type)?;
            }
        }

        self.rows.push(row);
        Ok(self)
    }

    pub fn row_with(
        &mut self,
        row: impl FnOnce(InsertRow) -> InsertRow,
    ) -> Result<&mut Self, SqlError> {
        self.row(row(InsertRow::new()))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn node(&self) -> InsertNode {
        let designated = self.table.designated_timestamp();

        let (columns, column_types): (Vec<_>, Vec<_>) = self
            .table
            .columns()
            .filter(|(name, _)| {
                Some(*name) == designated
                    || self.rows.iter().any(|row| row.cells.contains_key(*name))
            })
            .map(|(name, column)| (name.to_string(), column.column_type))
            .unzip();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(&column_types)
                    .map(|(name, column_type)| match row.cells.get(name) {
                        None if Some(name.as_str()) == designated => {
                            InsertCell::Raw(CURRENT_TIMESTAMP.to_string())
                        }
                        None | Some(InsertCell::Value(Value::Null))
                            if !column_type.is_nullable() =>
                        {
                            InsertCell::Value(non_null_default(*column_type))
                        }
                        Some(cell) => cell.clone(),
                        None => InsertCell::Value(Value::Null),
                    })
                    .collect()
            })
            .collect();

        InsertNode {
            table: self.table.name().to_string(),
            columns,
            column_types,
            rows,
        }
    }

    pub fn to_sql(&self) -> Result<String, SqlError> {
        self.node().to_sql()
    }

    pub async fn execute(&self, transport: &dyn Transport) -> Result<RawResponse, SqlError> {
        let sql = self.to_sql()?;
        debug!("Executing insert of {} rows: {}", self.rows.len(), sql);

        Ok(transport.execute(&sql).await?)
    }
}
