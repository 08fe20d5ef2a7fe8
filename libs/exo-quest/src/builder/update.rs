// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use tracing::debug;

use crate::{
    Assignment, ColumnDescriptor, ColumnRef, ExpressionBuilder, RawResponse, Source, SqlError,
    SqlExpr, TableColumns, TableDescriptor, Transport, UpdateNode, Value, format_literal,
};

/// Builds an UPDATE of one table, in place.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: Arc<TableDescriptor>,
    node: UpdateNode,
    from: Option<TableColumns>,
}

impl UpdateBuilder {
    pub fn new(table: &Arc<TableDescriptor>) -> Self {
        Self {
            table: table.clone(),
            node: UpdateNode::new(table.name()),
            from: None,
        }
    }

    /// Assign a value, formatted per the column's declared type
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self, SqlError> {
        let value = value.into();
        let column_type = self.assignable(column)?.column_type;
        format_literal(&value, column_type)?;

        self.push_assignment(column, SqlExpr::literal(value, column_type));
        Ok(self)
    }

    /// Assign the result of an expression, such as `kwh * 2` or a column of the FROM table
    pub fn set_expr(&mut self, column: &str, value: SqlExpr) -> Result<&mut Self, SqlError> {
        self.assignable(column)?;

        self.push_assignment(column, value);
        Ok(self)
    }

    /// Read values from a second table, available through [Self::from_columns]
    pub fn from_table(&mut self, table: &Arc<TableDescriptor>, alias: &str) -> &mut Self {
        self.node.from = Some(Source::aliased_table(table.name(), alias));
        self.from = Some(TableColumns::new(Some(table.clone()), Some(alias.to_string())));
        self
    }

    /// Restrict the updated rows. Repeated calls AND the predicates together.
    pub fn where_(&mut self, predicate: SqlExpr) -> &mut Self {
        self.node.where_clause = Some(match self.node.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn where_with(&mut self, predicate: impl FnOnce(&TableColumns) -> SqlExpr) -> &mut Self {
        let predicate = predicate(&self.table_columns());
        self.where_(predicate)
    }

    /// The columns of the updated table. They are qualified by the table name once a FROM
    /// table is present.
    pub fn table_columns(&self) -> TableColumns {
        let qualifier = self.from.as_ref().map(|_| self.table.name().to_string());
        TableColumns::new(Some(self.table.clone()), qualifier)
    }

    pub fn from_columns(&self) -> Option<&TableColumns> {
        self.from.as_ref()
    }

    pub fn col(&self, name: &str) -> ColumnRef {
        self.table_columns().col(name)
    }

    pub fn node(&self) -> &UpdateNode {
        &self.node
    }

    pub fn to_sql(&self) -> Result<String, SqlError> {
        self.node.to_sql()
    }

    pub async fn execute(&self, transport: &dyn Transport) -> Result<RawResponse, SqlError> {
        let sql = self.to_sql()?;
        debug!("Executing update: {}", sql);

        Ok(transport.execute(&sql).await?)
    }

    fn assignable(&self, column: &str) -> Result<&ColumnDescriptor, SqlError> {
        let descriptor = self.table.column(column).ok_or_else(|| {
            SqlError::validation(format!(
                "Column {column} is not a column of {}",
                self.table.name()
            ))
        })?;

        if descriptor.is_designated() {
            return Err(SqlError::validation(format!(
                "The designated timestamp {column} of {} cannot be updated",
                self.table.name()
            )));
        }

        Ok(descriptor)
    }

    fn push_assignment(&mut self, column: &str, value: SqlExpr) {
        self.node.assignments.push(Assignment {
            column: column.to_string(),
            value,
        });
    }
}
