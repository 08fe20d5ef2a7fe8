// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Logical combinators over boolean expressions.

use crate::SqlError;

use super::expr::{BinaryOp, SqlExpr};

/// Logical and of the given expressions, folded to the left: `and([a, b, c])` is
/// `((a AND b) AND c)`. A single expression is returned as is.
pub fn and(exprs: impl IntoIterator<Item = SqlExpr>) -> Result<SqlExpr, SqlError> {
    fold_left("and", BinaryOp::And, exprs)
}

/// Logical or of the given expressions, folded to the left.
pub fn or(exprs: impl IntoIterator<Item = SqlExpr>) -> Result<SqlExpr, SqlError> {
    fold_left("or", BinaryOp::Or, exprs)
}

pub fn not(expr: SqlExpr) -> SqlExpr {
    !expr
}

fn fold_left(
    name: &'static str,
    op: BinaryOp,
    exprs: impl IntoIterator<Item = SqlExpr>,
) -> Result<SqlExpr, SqlError> {
    let mut exprs = exprs.into_iter();
    let first = exprs.next().ok_or(SqlError::ArgumentCount(name))?;

    Ok(exprs.fold(first, |acc, expr| SqlExpr::binary(op, acc, expr)))
}
