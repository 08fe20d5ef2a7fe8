// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder,
    literal::{escape_identifier, escape_string, format_literal},
};
use crate::{ColumnType, SqlError, Value};

/// Accumulates SQL text. Identifiers and literals only enter through the escaping helpers.
pub struct SQLBuilder {
    sql: String,
}

impl SQLBuilder {
    pub fn new() -> Self {
        Self { sql: String::new() }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Start a new clause. Statements put each clause on its own line.
    pub fn push_line(&mut self) {
        self.sql.push('\n');
    }

    /// Push an identifier (table, column, alias), quoting it only when it isn't a plain
    /// identifier.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(&escape_identifier(s.as_ref()));
    }

    /// Push `<qualifier>.<column_name>` if a qualifier is given, otherwise just `<column_name>`.
    pub fn push_column<T: AsRef<str>>(&mut self, qualifier: Option<T>, column_name: T) {
        if let Some(qualifier) = qualifier {
            self.push_identifier(qualifier);
            self.push('.');
        }
        self.push_identifier(column_name);
    }

    /// Push a single-quoted string literal
    pub fn push_string_literal<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(&escape_string(s.as_ref()));
    }

    /// Push a value formatted for the given column type
    pub fn push_literal(&mut self, value: &Value, column_type: ColumnType) -> Result<(), SqlError> {
        let literal = format_literal(value, column_type)?;
        self.sql.push_str(&literal);
        Ok(())
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SQLBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl Iterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T) -> Result<(), SqlError>,
    ) -> Result<(), SqlError> {
        for (i, item) in iter.enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            push_elem(self, item)?;
        }
        Ok(())
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(
        &mut self,
        elems: &[T],
        sep: &str,
    ) -> Result<(), SqlError> {
        self.push_iter(elems.iter(), sep, |builder, elem| elem.build(builder))
    }

    /// Push identifiers separated by `, `
    pub fn push_identifiers<T: AsRef<str>>(&mut self, names: &[T]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_identifier(name);
        }
    }

    /// Get the SQL string. Calling this method should be the final step in building an SQL
    /// expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl Default for SQLBuilder {
    fn default() -> Self {
        Self::new()
    }
}
