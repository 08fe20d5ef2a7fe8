// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder, expr::SqlExpr};

/// A function call such as `sum(price)` or `now()`, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<SqlExpr>,
    pub alias: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<SqlExpr>) -> Self {
        Self {
            name: name.into(),
            args,
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Mark this call as an aggregate (`sum`, `avg`, `first`, ...)
    pub fn into_aggregate(self) -> SqlExpr {
        SqlExpr::Aggregate(self)
    }
}

impl ExpressionBuilder for FunctionCall {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        builder.push_identifier(&self.name);
        builder.push('(');
        builder.push_elems(&self.args, ", ")?;
        builder.push(')');
        if let Some(alias) = &self.alias {
            builder.push_str(" AS ");
            builder.push_identifier(alias);
        }
        Ok(())
    }
}

/// A scalar function call
pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = SqlExpr>) -> FunctionCall {
    FunctionCall::new(name, args.into_iter().collect())
}

/// An aggregate function call
pub fn aggregate(name: impl Into<String>, args: impl IntoIterator<Item = SqlExpr>) -> SqlExpr {
    function(name, args).into_aggregate()
}

/// `count(*)`
pub fn count_star() -> SqlExpr {
    aggregate("count", [SqlExpr::raw("*")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls() {
        assert_sql!(function("now", []), "now()");
        assert_sql!(
            function("round", [SqlExpr::column("price"), SqlExpr::raw("2")]),
            "round(price, 2)"
        );
        assert_sql!(count_star(), "count(*)");
        assert_sql!(
            function("avg", [SqlExpr::column("price")])
                .alias("avg price")
                .into_aggregate(),
            r#"avg(price) AS "avg price""#
        );
    }

    #[test]
    fn aggregate_flag() {
        assert!(aggregate("sum", [SqlExpr::column("qty")]).is_aggregate());
        assert!(!SqlExpr::from(function("abs", [SqlExpr::column("qty")])).is_aggregate());
    }
}
