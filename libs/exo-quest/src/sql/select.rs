// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{
    ExpressionBuilder, SQLBuilder, expr::SqlExpr, join::Join, latest_on::LatestOn, limit::Limit,
    order::OrderBy, sample_by::SampleBy, table::Source,
};

/// A projected expression, optionally aliased
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

impl Projection {
    pub fn new(expr: SqlExpr, alias: Option<String>) -> Self {
        Self { expr, alias }
    }
}

impl ExpressionBuilder for Projection {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        self.expr.build(builder)?;
        if let Some(alias) = &self.alias {
            builder.push_str(" AS ");
            builder.push_identifier(alias);
        }
        Ok(())
    }
}

/// A select statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectNode {
    pub distinct: bool,
    /// The projected expressions. Empty means `*`.
    pub projections: Vec<Projection>,
    /// The table or subquery to select from
    pub source: Source,
    pub joins: Vec<Join>,
    pub where_clause: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub order_by: OrderBy,
    pub limit: Option<Limit>,
    pub sample_by: Option<SampleBy>,
    pub latest_on: Option<LatestOn>,
}

impl SelectNode {
    pub fn new(source: Source) -> Self {
        Self {
            distinct: false,
            projections: vec![],
            source,
            joins: vec![],
            where_clause: None,
            group_by: vec![],
            order_by: OrderBy::default(),
            limit: None,
            sample_by: None,
            latest_on: None,
        }
    }

    /// Qualify the bare column references of the projections and the WHERE, GROUP BY and
    /// ORDER BY clauses that `owns` claims. Projection aliases are never qualified.
    pub(crate) fn qualify_columns(&mut self, qualifier: &str, owns: impl Fn(&str) -> bool) {
        let aliases: Vec<String> = self
            .projections
            .iter()
            .filter_map(|projection| projection.alias.clone())
            .collect();
        let owns = |name: &str| !aliases.iter().any(|alias| alias == name) && owns(name);

        let exprs = self
            .projections
            .iter_mut()
            .map(|projection| &mut projection.expr)
            .chain(self.where_clause.iter_mut())
            .chain(self.group_by.iter_mut())
            .chain(self.order_by.0.iter_mut().map(|element| &mut element.0));
        for expr in exprs {
            expr.qualify_columns(qualifier, &owns);
        }
    }
}

impl ExpressionBuilder for SelectNode {
    /// Build a select statement, one clause per line. The clause order is fixed; in
    /// particular, LATEST ON precedes WHERE in this dialect.
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        if self.sample_by.is_some() {
            if self.projections.is_empty() {
                return Err(SqlError::validation(
                    "SAMPLE BY requires explicit projections; it cannot be combined with SELECT *",
                ));
            }
            if !self
                .projections
                .iter()
                .any(|projection| projection.expr.is_aggregate())
            {
                return Err(SqlError::validation(
                    "SAMPLE BY requires at least one aggregate projection",
                ));
            }
        }

        builder.push_str("SELECT ");
        if self.distinct {
            builder.push_str("DISTINCT ");
        }
        if self.projections.is_empty() {
            builder.push('*');
        } else {
            builder.push_elems(&self.projections, ", ")?;
        }

        builder.push_line();
        builder.push_str("FROM ");
        self.source.build(builder)?;

        for join in &self.joins {
            builder.push_line();
            join.build(builder)?;
        }

        if let Some(latest_on) = &self.latest_on {
            builder.push_line();
            latest_on.build(builder)?;
        }

        if let Some(where_clause) = &self.where_clause {
            builder.push_line();
            builder.push_str("WHERE ");
            where_clause.build(builder)?;
        }

        if let Some(sample_by) = &self.sample_by {
            builder.push_line();
            sample_by.build(builder)?;
        }

        if !self.group_by.is_empty() {
            builder.push_line();
            builder.push_str("GROUP BY ");
            builder.push_elems(&self.group_by, ", ")?;
        }

        if !self.order_by.is_empty() {
            builder.push_line();
            self.order_by.build(builder)?;
        }

        if let Some(limit) = &self.limit {
            builder.push_line();
            limit.build(builder)?;
        }

        Ok(())
    }
}
