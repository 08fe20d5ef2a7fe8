// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{ColumnType, SqlError, Value};

use super::{ExpressionBuilder, SQLBuilder};

/// A cell of an insert row
#[derive(Debug, Clone, PartialEq)]
pub enum InsertCell {
    /// A value, formatted per its column's type
    Value(Value),
    /// Pre-rendered SQL (for example `now()`), emitted verbatim
    Raw(String),
}

/// A multi-row insert statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertNode {
    pub table: String,
    pub columns: Vec<String>,
    /// The type of each column, parallel to `columns`
    pub column_types: Vec<ColumnType>,
    /// Each row has one cell per column
    pub rows: Vec<Vec<InsertCell>>,
}

impl InsertNode {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            column_types: vec![],
            rows: vec![],
        }
    }
}

impl ExpressionBuilder for InsertNode {
    /// Build a statement of the form
    /// ```sql
    /// INSERT INTO <table> (<columns>) VALUES
    /// (<cells>),
    /// (<cells>)
    /// ```
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        if self.rows.is_empty() {
            return Err(SqlError::validation(format!(
                "INSERT INTO {} requires at least one row",
                self.table
            )));
        }
        if self.columns.is_empty() {
            return Err(SqlError::validation(format!(
                "INSERT INTO {} requires at least one column",
                self.table
            )));
        }
        if self.columns.len() != self.column_types.len() {
            return Err(SqlError::validation(format!(
                "INSERT INTO {} has {} columns but {} column types",
                self.table,
                self.columns.len(),
                self.column_types.len()
            )));
        }
        if let Some(row) = self.rows.iter().find(|row| row.len() != self.columns.len()) {
            return Err(SqlError::validation(format!(
                "INSERT INTO {} has {} columns but a row with {} cells",
                self.table,
                self.columns.len(),
                row.len()
            )));
        }

        builder.push_str("INSERT INTO ");
        builder.push_identifier(&self.table);
        builder.push_str(" (");
        builder.push_identifiers(&self.columns);
        builder.push_str(") VALUES");

        builder.push_iter(self.rows.iter(), ",", |builder, row| {
            builder.push_line();
            builder.push('(');
            builder.push_iter(
                row.iter().zip(&self.column_types),
                ", ",
                |builder, (cell, column_type)| match cell {
                    InsertCell::Value(value) => builder.push_literal(value, *column_type),
                    InsertCell::Raw(sql) => {
                        builder.push_str(sql);
                        Ok(())
                    }
                },
            )?;
            builder.push(')');
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> InsertNode {
        InsertNode {
            table: "readings".into(),
            columns: vec!["ts".into(), "source".into(), "kwh".into()],
            column_types: vec![ColumnType::Timestamp, ColumnType::Symbol, ColumnType::Double],
            rows: vec![],
        }
    }

    #[test]
    fn rows() {
        let mut insert = readings();
        insert.rows = vec![
            vec![
                InsertCell::Raw("now()".into()),
                InsertCell::Value("solar".into()),
                InsertCell::Value(1.5.into()),
            ],
            vec![
                InsertCell::Value(1700000000000000i64.into()),
                InsertCell::Value("o'neil".into()),
                InsertCell::Value(Value::Null),
            ],
        ];

        assert_sql!(
            insert,
            "INSERT INTO readings (ts, source, kwh) VALUES\n\
             (now(), 'solar', 1.5),\n\
             (1700000000000000, 'o''neil', NULL)"
        );
    }

    #[test]
    fn empty() {
        let insert = readings();
        match insert.to_sql() {
            Err(SqlError::Validation(message)) => assert!(message.contains("at least one row")),
            other => panic!("Unexpected rendering: {other:?}"),
        }
    }

    #[test]
    fn no_columns() {
        let mut insert = InsertNode::new("plain");
        insert.rows = vec![vec![]];
        assert_sql_err!(insert, SqlError::Validation(_));
    }

    #[test]
    fn ragged_rows() {
        let mut insert = readings();
        insert.rows = vec![vec![InsertCell::Value(Value::Null)]];
        assert_sql_err!(insert, SqlError::Validation(_));
    }
}
