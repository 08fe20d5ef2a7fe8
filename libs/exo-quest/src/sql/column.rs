// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::{ColumnType, TableDescriptor, Value};

use super::expr::{BinaryOp, SqlExpr};

/// A column as seen from a statement, producing comparison expressions against it.
///
/// When the column comes from a [TableDescriptor], its declared type is used for every
/// literal it creates. Otherwise the literal type is inferred from each value.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    name: String,
    qualifier: Option<String>,
    declared: Option<ColumnType>,
}

impl ColumnRef {
    pub fn new(
        name: impl Into<String>,
        qualifier: Option<String>,
        declared: Option<ColumnType>,
    ) -> Self {
        Self {
            name: name.into(),
            qualifier,
            declared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn declared_type(&self) -> Option<ColumnType> {
        self.declared
    }

    /// The bare column, for use in join predicates and projections
    pub fn reference(&self) -> SqlExpr {
        SqlExpr::Column {
            name: self.name.clone(),
            qualifier: self.qualifier.clone(),
        }
    }

    /// Compare for equality. Comparing with null yields `IS NULL`.
    pub fn eq(&self, value: impl Into<Value>) -> SqlExpr {
        let value = value.into();
        if value.is_null() {
            self.is_null()
        } else {
            self.compare(BinaryOp::Eq, value)
        }
    }

    /// Compare for inequality. Comparing with null yields `IS NOT NULL`.
    pub fn ne(&self, value: impl Into<Value>) -> SqlExpr {
        let value = value.into();
        if value.is_null() {
            self.is_not_null()
        } else {
            self.compare(BinaryOp::Neq, value)
        }
    }

    pub fn gt(&self, value: impl Into<Value>) -> SqlExpr {
        self.compare(BinaryOp::Gt, value.into())
    }

    pub fn gte(&self, value: impl Into<Value>) -> SqlExpr {
        self.compare(BinaryOp::Gte, value.into())
    }

    pub fn lt(&self, value: impl Into<Value>) -> SqlExpr {
        self.compare(BinaryOp::Lt, value.into())
    }

    pub fn lte(&self, value: impl Into<Value>) -> SqlExpr {
        self.compare(BinaryOp::Lte, value.into())
    }

    pub fn eq_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Eq, self.reference(), other)
    }

    pub fn ne_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Neq, self.reference(), other)
    }

    pub fn gt_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Gt, self.reference(), other)
    }

    pub fn gte_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Gte, self.reference(), other)
    }

    pub fn lt_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Lt, self.reference(), other)
    }

    pub fn lte_expr(&self, other: SqlExpr) -> SqlExpr {
        SqlExpr::binary(BinaryOp::Lte, self.reference(), other)
    }

    pub fn in_list<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> SqlExpr {
        SqlExpr::InList {
            column: Box::new(self.reference()),
            values: values.into_iter().map(|v| self.literal(v.into())).collect(),
        }
    }

    pub fn is_null(&self) -> SqlExpr {
        SqlExpr::IsNull {
            column: Box::new(self.reference()),
            negated: false,
        }
    }

    pub fn is_not_null(&self) -> SqlExpr {
        SqlExpr::IsNull {
            column: Box::new(self.reference()),
            negated: true,
        }
    }

    /// Inclusive range test
    pub fn between(&self, low: impl Into<Value>, high: impl Into<Value>) -> SqlExpr {
        SqlExpr::Between {
            column: Box::new(self.reference()),
            low: Box::new(self.literal(low.into())),
            high: Box::new(self.literal(high.into())),
        }
    }

    pub fn like(&self, pattern: &str) -> SqlExpr {
        self.pattern(BinaryOp::Like, pattern)
    }

    pub fn ilike(&self, pattern: &str) -> SqlExpr {
        self.pattern(BinaryOp::ILike, pattern)
    }

    /// Regular expression match
    pub fn matches(&self, regex: &str) -> SqlExpr {
        self.pattern(BinaryOp::Matches, regex)
    }

    /// Timestamp interval membership, such as `2024-01` or `2024-01-01T10;2h`
    pub fn within(&self, interval: impl Into<String>) -> SqlExpr {
        SqlExpr::TimestampInterval {
            column: Box::new(self.reference()),
            interval: interval.into(),
        }
    }

    fn compare(&self, op: BinaryOp, value: Value) -> SqlExpr {
        SqlExpr::binary(op, self.reference(), self.literal(value))
    }

    fn pattern(&self, op: BinaryOp, pattern: &str) -> SqlExpr {
        SqlExpr::binary(
            op,
            self.reference(),
            SqlExpr::literal(pattern, ColumnType::Varchar),
        )
    }

    fn literal(&self, value: Value) -> SqlExpr {
        let column_type = self.declared.unwrap_or_else(|| value.inferred_type());
        SqlExpr::Literal { value, column_type }
    }
}

/// Hands out [ColumnRef]s for one statement source.
#[derive(Debug, Clone)]
pub struct TableColumns {
    table: Option<Arc<TableDescriptor>>,
    qualifier: Option<String>,
}

impl TableColumns {
    pub fn new(table: Option<Arc<TableDescriptor>>, qualifier: Option<String>) -> Self {
        Self { table, qualifier }
    }

    /// Columns of a table, unqualified
    pub fn of(table: &Arc<TableDescriptor>) -> Self {
        Self::new(Some(table.clone()), None)
    }

    /// Columns with no declared types (every literal type is inferred)
    pub fn untyped(qualifier: Option<String>) -> Self {
        Self::new(None, qualifier)
    }

    pub fn table(&self) -> Option<&Arc<TableDescriptor>> {
        self.table.as_ref()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// A column of this source. Columns the table doesn't declare fall back to inferred
    /// literal types.
    pub fn col(&self, name: &str) -> ColumnRef {
        let declared = self
            .table
            .as_ref()
            .and_then(|table| table.column(name))
            .map(|column| column.column_type);

        ColumnRef::new(name, self.qualifier.clone(), declared)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ColumnDescriptor;

    fn readings() -> Arc<TableDescriptor> {
        TableDescriptor::builder("readings")
            .column("ts", ColumnDescriptor::designated_timestamp())
            .column("source", ColumnDescriptor::symbol())
            .column("kwh", ColumnDescriptor::new(ColumnType::Double))
            .column("meter", ColumnDescriptor::new(ColumnType::Long256))
            .build()
            .unwrap()
    }

    #[test]
    fn declared_type_wins() {
        let columns = TableColumns::of(&readings());

        // An integer compared against a DOUBLE column stays a bare number, but a string
        // for a LONG256 column is quoted rather than guessed to be VARCHAR
        assert_sql!(columns.col("kwh").gt(3), "(kwh > 3)");
        assert_sql!(columns.col("meter").eq("0x01"), "(meter = '0x01')");
        assert_eq!(
            columns.col("source").eq("solar"),
            SqlExpr::binary(
                BinaryOp::Eq,
                SqlExpr::column("source"),
                SqlExpr::literal("solar", ColumnType::Symbol)
            )
        );
    }

    #[test]
    fn inference_without_declaration() {
        let columns = TableColumns::untyped(None);

        assert_sql!(columns.col("flag").eq(true), "(flag = true)");
        assert_sql!(columns.col("price").lte(2.5), "(price <= 2.5)");
        assert_sql!(columns.col("name").ne("x"), "(name != 'x')");

        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_sql!(
            columns.col("ts").gte(ts),
            "(ts >= '2024-03-01T00:00:00.000000Z')"
        );
    }

    #[test]
    fn null_comparisons_become_null_tests() {
        let columns = TableColumns::of(&readings());

        assert_sql!(columns.col("source").eq(Value::Null), "source IS NULL");
        assert_sql!(columns.col("source").ne(None::<&str>), "source IS NOT NULL");
    }

    #[test]
    fn membership_patterns_and_intervals() {
        let columns = TableColumns::new(Some(readings()), Some("r".into()));

        assert_sql!(
            columns.col("source").in_list(["solar", "wind"]),
            "r.source IN ('solar', 'wind')"
        );
        assert_sql!(
            columns.col("kwh").between(1, 10),
            "(r.kwh BETWEEN 1 AND 10)"
        );
        assert_sql!(columns.col("source").like("so%"), "(r.source LIKE 'so%')");
        assert_sql!(
            columns.col("source").ilike("%O'L%"),
            "(r.source ILIKE '%O''L%')"
        );
        assert_sql!(columns.col("source").matches("^s"), "(r.source ~ '^s')");
        assert_sql!(columns.col("ts").within("2024-01"), "r.ts IN '2024-01'");
        let other = TableColumns::untyped(Some("o".into()));
        assert_sql!(
            columns.col("kwh").gt_expr(other.col("kwh").reference()),
            "(r.kwh > o.kwh)"
        );
    }
}
