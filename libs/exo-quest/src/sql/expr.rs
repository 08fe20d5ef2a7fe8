// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{ColumnType, SqlError, Value};

use super::{ExpressionBuilder, SQLBuilder, function::FunctionCall, select::SelectNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Like,
    ILike,
    /// Regular expression match (`~`)
    Matches,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn sql_operator(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Like => "LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::Matches => "~",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// An SQL expression.
///
/// Sub-expressions are owned, so an expression is always a tree; reusing an expression in
/// two places clones it.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column {
        name: String,
        qualifier: Option<String>,
    },
    Literal {
        value: Value,
        column_type: ColumnType,
    },
    Binary {
        op: BinaryOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<SqlExpr>,
    },
    Function(FunctionCall),
    Aggregate(FunctionCall),
    Subquery(Box<SelectNode>),
    /// The engine's interval membership test (`ts IN '2024-01'`)
    TimestampInterval {
        column: Box<SqlExpr>,
        interval: String,
    },
    InList {
        column: Box<SqlExpr>,
        values: Vec<SqlExpr>,
    },
    /// Inclusive on both bounds
    Between {
        column: Box<SqlExpr>,
        low: Box<SqlExpr>,
        high: Box<SqlExpr>,
    },
    IsNull {
        column: Box<SqlExpr>,
        negated: bool,
    },
    /// Pre-rendered SQL, emitted verbatim
    Raw(String),
}

impl SqlExpr {
    pub fn column(name: impl Into<String>) -> SqlExpr {
        SqlExpr::Column {
            name: name.into(),
            qualifier: None,
        }
    }

    pub fn qualified_column(qualifier: impl Into<String>, name: impl Into<String>) -> SqlExpr {
        SqlExpr::Column {
            name: name.into(),
            qualifier: Some(qualifier.into()),
        }
    }

    pub fn literal(value: impl Into<Value>, column_type: ColumnType) -> SqlExpr {
        SqlExpr::Literal {
            value: value.into(),
            column_type,
        }
    }

    /// A literal whose type is inferred from the value
    pub fn value(value: impl Into<Value>) -> SqlExpr {
        let value = value.into();
        let column_type = value.inferred_type();
        SqlExpr::Literal { value, column_type }
    }

    pub fn binary(op: BinaryOp, left: SqlExpr, right: SqlExpr) -> SqlExpr {
        SqlExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn raw(sql: impl Into<String>) -> SqlExpr {
        SqlExpr::Raw(sql.into())
    }

    pub fn subquery(select: SelectNode) -> SqlExpr {
        SqlExpr::Subquery(Box::new(select))
    }

    pub fn and(self, rhs: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Or, self, rhs)
    }

    /// Does this expression contain an aggregate (outside of any subquery)?
    pub fn is_aggregate(&self) -> bool {
        match self {
            SqlExpr::Aggregate(_) => true,
            SqlExpr::Function(call) => call.args.iter().any(|arg| arg.is_aggregate()),
            SqlExpr::Binary { left, right, .. } => left.is_aggregate() || right.is_aggregate(),
            SqlExpr::Unary { operand, .. } => operand.is_aggregate(),
            SqlExpr::Column { .. }
            | SqlExpr::Literal { .. }
            | SqlExpr::Subquery(_)
            | SqlExpr::TimestampInterval { .. }
            | SqlExpr::InList { .. }
            | SqlExpr::Between { .. }
            | SqlExpr::IsNull { .. }
            | SqlExpr::Raw(_) => false,
        }
    }

    /// Qualify the unqualified column references that `owns` claims. Subqueries and raw SQL
    /// are left alone.
    pub(crate) fn qualify_columns(&mut self, qualifier: &str, owns: &impl Fn(&str) -> bool) {
        match self {
            SqlExpr::Column {
                name,
                qualifier: existing,
            } => {
                if existing.is_none() && owns(name.as_str()) {
                    *existing = Some(qualifier.to_string());
                }
            }
            SqlExpr::Literal { .. } | SqlExpr::Subquery(_) | SqlExpr::Raw(_) => {}
            SqlExpr::Binary { left, right, .. } => {
                left.qualify_columns(qualifier, owns);
                right.qualify_columns(qualifier, owns);
            }
            SqlExpr::Unary { operand, .. } => operand.qualify_columns(qualifier, owns),
            SqlExpr::Function(call) | SqlExpr::Aggregate(call) => call
                .args
                .iter_mut()
                .for_each(|arg| arg.qualify_columns(qualifier, owns)),
            SqlExpr::TimestampInterval { column, .. } | SqlExpr::IsNull { column, .. } => {
                column.qualify_columns(qualifier, owns)
            }
            SqlExpr::InList { column, values } => {
                column.qualify_columns(qualifier, owns);
                values
                    .iter_mut()
                    .for_each(|value| value.qualify_columns(qualifier, owns));
            }
            SqlExpr::Between { column, low, high } => {
                column.qualify_columns(qualifier, owns);
                low.qualify_columns(qualifier, owns);
                high.qualify_columns(qualifier, owns);
            }
        }
    }
}

impl std::ops::Not for SqlExpr {
    type Output = SqlExpr;

    fn not(self) -> Self::Output {
        match self {
            // Flip null tests rather than wrapping them
            SqlExpr::IsNull { column, negated } => SqlExpr::IsNull {
                column,
                negated: !negated,
            },
            expr => SqlExpr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(expr),
            },
        }
    }
}

macro_rules! arithmetic_ops {
    ($($trait:ident, $method:ident, $op:expr);*) => {
        $(
            impl std::ops::$trait for SqlExpr {
                type Output = SqlExpr;

                fn $method(self, rhs: SqlExpr) -> Self::Output {
                    SqlExpr::binary($op, self, rhs)
                }
            }
        )*
    };
}

arithmetic_ops!(
    Add, add, BinaryOp::Add;
    Sub, sub, BinaryOp::Sub;
    Mul, mul, BinaryOp::Mul;
    Div, div, BinaryOp::Div
);

impl std::ops::Neg for SqlExpr {
    type Output = SqlExpr;

    fn neg(self) -> Self::Output {
        SqlExpr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }
    }
}

impl From<FunctionCall> for SqlExpr {
    fn from(call: FunctionCall) -> Self {
        SqlExpr::Function(call)
    }
}

impl ExpressionBuilder for SqlExpr {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        match self {
            SqlExpr::Column { name, qualifier } => {
                builder.push_column(qualifier.as_deref(), name.as_str());
                Ok(())
            }
            SqlExpr::Literal { value, column_type } => builder.push_literal(value, *column_type),
            SqlExpr::Binary { op, left, right } => {
                builder.push('(');
                left.build(builder)?;
                builder.push_space();
                builder.push_str(op.sql_operator());
                builder.push_space();
                right.build(builder)?;
                builder.push(')');
                Ok(())
            }
            SqlExpr::Unary { op, operand } => {
                builder.push('(');
                match op {
                    UnaryOp::Not => builder.push_str("NOT "),
                    UnaryOp::Neg => builder.push('-'),
                }
                operand.build(builder)?;
                builder.push(')');
                Ok(())
            }
            SqlExpr::Function(call) | SqlExpr::Aggregate(call) => call.build(builder),
            SqlExpr::Subquery(select) => {
                builder.push('(');
                select.build(builder)?;
                builder.push(')');
                Ok(())
            }
            SqlExpr::TimestampInterval { column, interval } => {
                column.build(builder)?;
                builder.push_str(" IN ");
                builder.push_string_literal(interval);
                Ok(())
            }
            SqlExpr::InList { column, values } => {
                if values.is_empty() {
                    return Err(SqlError::validation(
                        "IN requires at least one value; an empty list matches nothing",
                    ));
                }
                column.build(builder)?;
                builder.push_str(" IN (");
                builder.push_elems(values, ", ")?;
                builder.push(')');
                Ok(())
            }
            SqlExpr::Between { column, low, high } => {
                builder.push('(');
                column.build(builder)?;
                builder.push_str(" BETWEEN ");
                low.build(builder)?;
                builder.push_str(" AND ");
                high.build(builder)?;
                builder.push(')');
                Ok(())
            }
            SqlExpr::IsNull { column, negated } => {
                column.build(builder)?;
                if *negated {
                    builder.push_str(" IS NOT NULL");
                } else {
                    builder.push_str(" IS NULL");
                }
                Ok(())
            }
            SqlExpr::Raw(sql) => {
                builder.push_str(sql);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(value: i64) -> SqlExpr {
        SqlExpr::literal(value, ColumnType::Long)
    }

    #[test]
    fn columns() {
        assert_sql!(SqlExpr::column("price"), "price");
        assert_sql!(SqlExpr::qualified_column("t", "price"), "t.price");
        assert_sql!(
            SqlExpr::qualified_column("order book", "bid price"),
            r#""order book"."bid price""#
        );
    }

    #[test]
    fn binary_is_fully_parenthesized() {
        let expr = (SqlExpr::column("a") + long(1)) * (SqlExpr::column("b") - long(2));
        assert_sql!(expr, "((a + 1) * (b - 2))");

        let expr = SqlExpr::binary(
            BinaryOp::Neq,
            SqlExpr::column("side"),
            SqlExpr::value("buy"),
        );
        assert_sql!(expr, "(side != 'buy')");
    }

    #[test]
    fn unary() {
        let expr = !SqlExpr::binary(BinaryOp::Gt, SqlExpr::column("qty"), long(10));
        assert_sql!(expr, "(NOT (qty > 10))");
        assert_sql!(-SqlExpr::column("qty"), "(-qty)");
    }

    #[test]
    fn not_flips_null_tests() {
        let is_null = SqlExpr::IsNull {
            column: Box::new(SqlExpr::column("note")),
            negated: false,
        };
        assert_sql!(is_null.clone(), "note IS NULL");
        assert_sql!(!is_null, "note IS NOT NULL");
    }

    #[test]
    fn membership_and_ranges() {
        let in_list = SqlExpr::InList {
            column: Box::new(SqlExpr::column("symbol")),
            values: vec![
                SqlExpr::literal("BTC", ColumnType::Symbol),
                SqlExpr::literal("ETH", ColumnType::Symbol),
            ],
        };
        assert_sql!(in_list, "symbol IN ('BTC', 'ETH')");

        let empty = SqlExpr::InList {
            column: Box::new(SqlExpr::column("symbol")),
            values: vec![],
        };
        assert_sql_err!(empty, SqlError::Validation(_));

        let between = SqlExpr::Between {
            column: Box::new(SqlExpr::column("price")),
            low: Box::new(long(1)),
            high: Box::new(long(5)),
        };
        assert_sql!(between, "(price BETWEEN 1 AND 5)");

        let interval = SqlExpr::TimestampInterval {
            column: Box::new(SqlExpr::column("ts")),
            interval: "2024-01-01;1d".into(),
        };
        assert_sql!(interval, "ts IN '2024-01-01;1d'");
    }

    #[test]
    fn literal_errors_surface_at_render() {
        let expr = SqlExpr::binary(
            BinaryOp::Eq,
            SqlExpr::column("payload"),
            SqlExpr::literal(vec![1u8, 2], ColumnType::Binary),
        );
        assert_sql_err!(expr, SqlError::BinaryLiteral);
    }

    #[test]
    fn aggregates_are_detected_through_operators() {
        let expr =
            SqlExpr::Aggregate(FunctionCall::new("sum", vec![SqlExpr::column("qty")])) / long(2);
        assert!(expr.is_aggregate());
        assert!(!SqlExpr::column("qty").is_aggregate());
    }

    #[test]
    fn qualify_only_owned_bare_columns() {
        let mut expr = SqlExpr::binary(
            BinaryOp::Gt,
            SqlExpr::column("qty"),
            SqlExpr::qualified_column("q", "qty"),
        )
        .and(SqlExpr::column("n").or(SqlExpr::Between {
            column: Box::new(SqlExpr::column("price")),
            low: Box::new(long(1)),
            high: Box::new(long(5)),
        }));
        expr.qualify_columns("t", &|name| name != "n");

        assert_sql!(
            expr,
            "((t.qty > q.qty) AND (n OR (t.price BETWEEN 1 AND 5)))"
        );
    }
}
