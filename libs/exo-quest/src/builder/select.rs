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
    ColumnRef, ExpressionBuilder, Join, JoinKind, LatestOn, Limit, OrderByElement, Ordering,
    Projection, Row, SampleBy, SelectNode, Source, SqlError, SqlExpr, TableColumns,
    TableDescriptor, Transport, parse_rows,
};

/// A copy-on-write SELECT builder.
///
/// Every call returns a new builder and leaves `self` untouched, so a partially built query
/// can be shared and extended in different directions:
///
/// ```ignore
/// let base = SelectBuilder::new(&readings).where_with(|t| t.col("source").eq("solar"));
/// let latest = base.order_by("ts", Ordering::Desc).limit(1);
/// let hourly = base.select_expr(avg_kwh).sample_by(SampleBy::new("1h"));
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    node: SelectNode,
    /// The descriptor of the main source, when it is a table
    table: Option<Arc<TableDescriptor>>,
}

/// A join predicate over the left (main source) and right (joined table) columns
type JoinPredicate = fn(&TableColumns, &TableColumns) -> SqlExpr;

impl SelectBuilder {
    pub fn new(table: &Arc<TableDescriptor>) -> Self {
        Self {
            node: SelectNode::new(Source::table(table.name())),
            table: Some(table.clone()),
        }
    }

    pub fn aliased(table: &Arc<TableDescriptor>, alias: impl Into<String>) -> Self {
        Self {
            node: SelectNode::new(Source::aliased_table(table.name(), alias)),
            table: Some(table.clone()),
        }
    }

    /// Select from a table with no descriptor. Literal types are inferred from values.
    pub fn unbound(table: impl Into<String>) -> Self {
        Self {
            node: SelectNode::new(Source::table(table)),
            table: None,
        }
    }

    /// Select from the result of another query
    pub fn from_subquery(inner: &SelectBuilder, alias: impl Into<String>) -> Self {
        Self {
            node: SelectNode::new(Source::subquery(inner.node.clone(), alias)),
            table: None,
        }
    }

    pub fn distinct(&self) -> Self {
        self.with(|node| node.distinct = true)
    }

    /// Project the named columns, in addition to any existing projections
    pub fn columns(&self, names: &[&str]) -> Self {
        let columns = self.table_columns();
        let projections = names
            .iter()
            .map(|name| Projection::new(columns.col(name).reference(), None));
        self.with(|node| node.projections.extend(projections))
    }

    pub fn column_as(&self, name: &str, alias: impl Into<String>) -> Self {
        let projection = Projection::new(self.col(name).reference(), Some(alias.into()));
        self.with(|node| node.projections.push(projection))
    }

    pub fn select_expr(&self, expr: impl Into<SqlExpr>) -> Self {
        let projection = Projection::new(expr.into(), None);
        self.with(|node| node.projections.push(projection))
    }

    pub fn select_expr_as(&self, expr: impl Into<SqlExpr>, alias: impl Into<String>) -> Self {
        let projection = Projection::new(expr.into(), Some(alias.into()));
        self.with(|node| node.projections.push(projection))
    }

    /// Set the WHERE clause, replacing any existing one
    pub fn where_(&self, predicate: SqlExpr) -> Self {
        self.with(|node| node.where_clause = Some(predicate))
    }

    pub fn where_with(&self, predicate: impl FnOnce(&TableColumns) -> SqlExpr) -> Self {
        self.where_(predicate(&self.table_columns()))
    }

    /// AND the predicate with the existing WHERE clause (or set it, if there is none)
    pub fn and_where(&self, predicate: SqlExpr) -> Self {
        self.with(|node| {
            node.where_clause = Some(match node.where_clause.take() {
                Some(existing) => existing.and(predicate),
                None => predicate,
            })
        })
    }

    pub fn and_where_with(&self, predicate: impl FnOnce(&TableColumns) -> SqlExpr) -> Self {
        self.and_where(predicate(&self.table_columns()))
    }

    pub fn order_by(&self, name: &str, ordering: Ordering) -> Self {
        self.order_by_expr(self.col(name).reference(), ordering)
    }

    pub fn order_by_expr(&self, expr: SqlExpr, ordering: Ordering) -> Self {
        self.with(|node| node.order_by.push(OrderByElement(expr, ordering)))
    }

    pub fn limit(&self, count: i64) -> Self {
        self.with(|node| {
            node.limit = Some(Limit {
                count,
                offset: None,
            })
        })
    }

    pub fn limit_offset(&self, count: i64, offset: i64) -> Self {
        self.with(|node| {
            node.limit = Some(Limit {
                count,
                offset: Some(offset),
            })
        })
    }

    pub fn group_by(&self, names: &[&str]) -> Self {
        let columns = self.table_columns();
        let exprs = names.iter().map(|name| columns.col(name).reference());
        self.with(|node| node.group_by.extend(exprs))
    }

    pub fn group_by_expr(&self, expr: SqlExpr) -> Self {
        self.with(|node| node.group_by.push(expr))
    }

    pub fn sample_by(&self, sample_by: SampleBy) -> Self {
        self.with(|node| node.sample_by = Some(sample_by))
    }

    /// Keep only the latest row for each combination of the partition columns.
    ///
    /// The source must be a table with a designated timestamp, and every partition column
    /// must belong to it.
    pub fn latest_on(&self, partition_by: &[&str]) -> Result<Self, SqlError> {
        let table = self.table.as_ref().ok_or_else(|| {
            SqlError::validation("LATEST ON requires a table with a designated timestamp")
        })?;
        let timestamp = table.designated_timestamp().ok_or_else(|| {
            SqlError::validation(format!(
                "LATEST ON requires a designated timestamp, but {} has none",
                table.name()
            ))
        })?;

        if partition_by.is_empty() {
            return Err(SqlError::validation("LATEST ON requires at least one PARTITION BY column"));
        }
        if let Some(unknown) = partition_by
            .iter()
            .find(|name| table.column(name).is_none())
        {
            return Err(SqlError::validation(format!(
                "LATEST ON partition column {unknown} is not a column of {}",
                table.name()
            )));
        }

        let latest_on = LatestOn {
            timestamp: timestamp.to_string(),
            partition_by: partition_by.iter().map(|name| name.to_string()).collect(),
        };
        Ok(self.with(|node| node.latest_on = Some(latest_on)))
    }

    pub fn inner_join(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr,
    ) -> Self {
        self.push_join(JoinKind::Inner, right, alias, Some(on), None)
    }

    pub fn left_join(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr,
    ) -> Self {
        self.push_join(JoinKind::Left, right, alias, Some(on), None)
    }

    pub fn cross_join(&self, right: &Arc<TableDescriptor>, alias: &str) -> Self {
        self.push_join(JoinKind::Cross, right, alias, None::<JoinPredicate>, None)
    }

    /// Join each row with the right row at or before its timestamp, matching on the
    /// predicate's keys
    pub fn asof_join(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr,
        tolerance: Option<&str>,
    ) -> Self {
        self.push_join(JoinKind::Asof, right, alias, Some(on), tolerance)
    }

    /// An ASOF join on timestamps alone
    pub fn asof_join_unkeyed(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        tolerance: Option<&str>,
    ) -> Self {
        self.push_join(
            JoinKind::Asof,
            right,
            alias,
            None::<JoinPredicate>,
            tolerance,
        )
    }

    pub fn lt_join(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr,
        tolerance: Option<&str>,
    ) -> Self {
        self.push_join(JoinKind::Lt, right, alias, Some(on), tolerance)
    }

    pub fn lt_join_unkeyed(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        tolerance: Option<&str>,
    ) -> Self {
        self.push_join(JoinKind::Lt, right, alias, None::<JoinPredicate>, tolerance)
    }

    pub fn splice_join(
        &self,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr,
    ) -> Self {
        self.push_join(JoinKind::Splice, right, alias, Some(on), None)
    }

    pub fn splice_join_unkeyed(&self, right: &Arc<TableDescriptor>, alias: &str) -> Self {
        self.push_join(JoinKind::Splice, right, alias, None::<JoinPredicate>, None)
    }

    /// The columns of the main source, for building predicates and projections.
    ///
    /// Columns are qualified once the source has an alias or the query has joins.
    pub fn table_columns(&self) -> TableColumns {
        let qualifier = if self.node.source.alias().is_some() || !self.node.joins.is_empty() {
            Some(self.node.source.qualifier().to_string())
        } else {
            None
        };
        TableColumns::new(self.table.clone(), qualifier)
    }

    pub fn col(&self, name: &str) -> ColumnRef {
        self.table_columns().col(name)
    }

    pub fn node(&self) -> &SelectNode {
        &self.node
    }

    pub fn into_node(self) -> SelectNode {
        self.node
    }

    pub fn to_sql(&self) -> Result<String, SqlError> {
        self.node.to_sql()
    }

    /// Run the query and decode its rows
    pub async fn execute(&self, transport: &dyn Transport) -> Result<Vec<Row>, SqlError> {
        let sql = self.to_sql()?;
        debug!("Executing select: {}", sql);

        let response = transport.execute(&sql).await?;
        parse_rows(&response)
    }

    /// Run the query with `LIMIT 1` and return its row, if any. An existing offset is kept.
    pub async fn first(&self, transport: &dyn Transport) -> Result<Option<Row>, SqlError> {
        let rows = self.first_row().execute(transport).await?;
        Ok(rows.into_iter().next())
    }

    fn first_row(&self) -> Self {
        self.with(|node| {
            let offset = node.limit.as_ref().and_then(|limit| limit.offset);
            node.limit = Some(Limit { count: 1, offset });
        })
    }

    fn with(&self, update: impl FnOnce(&mut SelectNode)) -> Self {
        let mut next = self.clone();
        update(&mut next.node);
        next
    }

    fn push_join(
        &self,
        kind: JoinKind,
        right: &Arc<TableDescriptor>,
        alias: &str,
        on: Option<impl FnOnce(&TableColumns, &TableColumns) -> SqlExpr>,
        tolerance: Option<&str>,
    ) -> Self {
        let left_columns = TableColumns::new(
            self.table.clone(),
            Some(self.node.source.qualifier().to_string()),
        );
        let right_columns = TableColumns::new(Some(right.clone()), Some(alias.to_string()));

        let predicate = on.map(|on| on(&left_columns, &right_columns));
        let mut join = Join::new(kind, Source::aliased_table(right.name(), alias), predicate);
        if let Some(tolerance) = tolerance {
            join = join.with_tolerance(tolerance);
        }

        let table = self.table.clone();
        self.with(|node| {
            // Columns added before the first join were rendered bare
            if node.joins.is_empty() && node.source.alias().is_none() {
                let qualifier = node.source.qualifier().to_string();
                node.qualify_columns(&qualifier, |name| match &table {
                    Some(table) => table.column(name).is_some(),
                    None => true,
                });
            }
            node.joins.push(join)
        })
    }
}
