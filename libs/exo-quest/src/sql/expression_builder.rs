// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::SQLBuilder;
use crate::SqlError;

/// A trait for types that can build themselves into an SQL expression.
///
/// Each constituent of an SQL statement (column, literal, join, select, etc.) implements this
/// trait, so statements can be rendered hierarchically into a single [SQLBuilder]. Building
/// fails only for contract violations that the node types cannot rule out on their own (a
/// literal that does not fit its declared type, SAMPLE BY over `*`, an empty INSERT, ...),
/// and it fails before the caller ever sees any text.
pub trait ExpressionBuilder {
    /// Build the SQL expression into the given SQL builder
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError>;

    /// Build the SQL expression into a string and return it.
    fn to_sql(&self) -> Result<String, SqlError>
    where
        Self: Sized,
    {
        let mut builder = SQLBuilder::new();
        self.build(&mut builder)?;
        Ok(builder.into_sql())
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        self.as_ref().build(builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        (**self).build(builder)
    }
}
