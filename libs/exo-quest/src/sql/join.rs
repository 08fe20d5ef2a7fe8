// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder, expr::SqlExpr, literal, table::Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Cross,
    /// Match each left row with the closest right row at or before its timestamp
    Asof,
    /// Like ASOF, but strictly before
    Lt,
    Splice,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Cross => "CROSS",
            JoinKind::Asof => "ASOF",
            JoinKind::Lt => "LT",
            JoinKind::Splice => "SPLICE",
        }
    }

    fn requires_predicate(&self) -> bool {
        matches!(self, JoinKind::Inner | JoinKind::Left)
    }

    fn accepts_predicate(&self) -> bool {
        !matches!(self, JoinKind::Cross)
    }

    fn accepts_tolerance(&self) -> bool {
        matches!(self, JoinKind::Asof | JoinKind::Lt)
    }
}

/// A join clause such as `ASOF JOIN quotes q ON (t.symbol = q.symbol) TOLERANCE 1s`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub source: Source,
    pub predicate: Option<SqlExpr>,
    pub tolerance: Option<String>,
}

impl Join {
    pub fn new(kind: JoinKind, source: Source, predicate: Option<SqlExpr>) -> Self {
        Self {
            kind,
            source,
            predicate,
            tolerance: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: impl Into<String>) -> Self {
        self.tolerance = Some(tolerance.into());
        self
    }

    fn validate(&self) -> Result<(), SqlError> {
        let keyword = self.kind.keyword();

        match &self.predicate {
            None if self.kind.requires_predicate() => Err(SqlError::validation(format!(
                "{keyword} JOIN requires an ON predicate"
            ))),
            Some(_) if !self.kind.accepts_predicate() => Err(SqlError::validation(format!(
                "{keyword} JOIN does not take an ON predicate"
            ))),
            _ => Ok(()),
        }?;

        match &self.tolerance {
            Some(_) if !self.kind.accepts_tolerance() => Err(SqlError::validation(format!(
                "{keyword} JOIN does not take a tolerance"
            ))),
            Some(tolerance) => literal::validate_duration("join tolerance", tolerance),
            None => Ok(()),
        }
    }
}

impl ExpressionBuilder for Join {
    /// Build expression of the form `<KIND> JOIN <source> [ON <predicate>] [TOLERANCE <t>]`
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        self.validate()?;

        builder.push_str(self.kind.keyword());
        builder.push_str(" JOIN ");
        self.source.build(builder)?;

        if let Some(predicate) = &self.predicate {
            builder.push_str(" ON ");
            predicate.build(builder)?;
        }
        if let Some(tolerance) = &self.tolerance {
            builder.push_str(" TOLERANCE ");
            builder.push_str(tolerance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::BinaryOp;

    fn symbol_match() -> SqlExpr {
        SqlExpr::binary(
            BinaryOp::Eq,
            SqlExpr::qualified_column("trades", "symbol"),
            SqlExpr::qualified_column("q", "symbol"),
        )
    }

    #[test]
    fn keyed_joins() {
        let join = Join::new(
            JoinKind::Inner,
            Source::aliased_table("quotes", "q"),
            Some(symbol_match()),
        );
        assert_sql!(join, "INNER JOIN quotes q ON (trades.symbol = q.symbol)");

        let join = Join::new(
            JoinKind::Asof,
            Source::aliased_table("quotes", "q"),
            Some(symbol_match()),
        )
        .with_tolerance("1s");
        assert_sql!(
            join,
            "ASOF JOIN quotes q ON (trades.symbol = q.symbol) TOLERANCE 1s"
        );
    }

    #[test]
    fn unkeyed_joins() {
        assert_sql!(
            Join::new(JoinKind::Cross, Source::aliased_table("fx", "f"), None),
            "CROSS JOIN fx f"
        );
        assert_sql!(
            Join::new(JoinKind::Lt, Source::aliased_table("fx", "f"), None).with_tolerance("10m"),
            "LT JOIN fx f TOLERANCE 10m"
        );
        assert_sql!(
            Join::new(JoinKind::Splice, Source::aliased_table("fx", "f"), None),
            "SPLICE JOIN fx f"
        );
    }

    #[test]
    fn invalid_joins() {
        assert_sql_err!(
            Join::new(JoinKind::Left, Source::table("quotes"), None),
            SqlError::Validation(_)
        );
        assert_sql_err!(
            Join::new(
                JoinKind::Cross,
                Source::table("quotes"),
                Some(symbol_match())
            ),
            SqlError::Validation(_)
        );
        assert_sql_err!(
            Join::new(JoinKind::Splice, Source::table("quotes"), None).with_tolerance("1s"),
            SqlError::Validation(_)
        );
        assert_sql_err!(
            Join::new(JoinKind::Asof, Source::table("quotes"), None).with_tolerance("1 second"),
            SqlError::Validation(_)
        );
    }
}
