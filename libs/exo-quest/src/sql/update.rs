// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder, expr::SqlExpr, table::Source};

/// `<column> = <value>` in a SET clause
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: SqlExpr,
}

impl ExpressionBuilder for Assignment {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        builder.push_identifier(&self.column);
        builder.push_str(" = ");
        self.value.build(builder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNode {
    pub table: String,
    pub assignments: Vec<Assignment>,
    /// A second source to read values from
    pub from: Option<Source>,
    pub where_clause: Option<SqlExpr>,
}

impl UpdateNode {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: vec![],
            from: None,
            where_clause: None,
        }
    }
}

impl ExpressionBuilder for UpdateNode {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        if self.assignments.is_empty() {
            return Err(SqlError::validation(format!(
                "UPDATE {} requires at least one assignment",
                self.table
            )));
        }

        builder.push_str("UPDATE ");
        builder.push_identifier(&self.table);

        builder.push_line();
        builder.push_str("SET ");
        builder.push_elems(&self.assignments, ", ")?;

        if let Some(from) = &self.from {
            builder.push_line();
            builder.push_str("FROM ");
            from.build(builder)?;
        }

        if let Some(where_clause) = &self.where_clause {
            builder.push_line();
            builder.push_str("WHERE ");
            where_clause.build(builder)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, sql::expr::BinaryOp};

    #[test]
    fn basic_update() {
        let mut update = UpdateNode::new("readings");
        update.assignments = vec![
            Assignment {
                column: "kwh".into(),
                value: SqlExpr::literal(2, ColumnType::Double),
            },
            Assignment {
                column: "note".into(),
                value: SqlExpr::literal("fixed", ColumnType::Varchar),
            },
        ];
        update.where_clause = Some(SqlExpr::binary(
            BinaryOp::Eq,
            SqlExpr::column("source"),
            SqlExpr::literal("solar", ColumnType::Symbol),
        ));

        assert_sql!(
            update,
            "UPDATE readings\nSET kwh = 2, note = 'fixed'\nWHERE (source = 'solar')"
        );
    }

    #[test]
    fn update_from() {
        let mut update = UpdateNode::new("readings");
        update.assignments = vec![Assignment {
            column: "kwh".into(),
            value: SqlExpr::qualified_column("c", "kwh"),
        }];
        update.from = Some(Source::aliased_table("corrections", "c"));

        assert_sql!(
            update,
            "UPDATE readings\nSET kwh = c.kwh\nFROM corrections c"
        );
    }

    #[test]
    fn no_assignments() {
        assert_sql_err!(UpdateNode::new("readings"), SqlError::Validation(_));
    }
}
