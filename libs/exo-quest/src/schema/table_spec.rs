// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{ColumnDescriptor, SqlError, sql::literal};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionBy {
    #[default]
    None,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Display for PartitionBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartitionBy::None => "NONE",
            PartitionBy::Hour => "HOUR",
            PartitionBy::Day => "DAY",
            PartitionBy::Week => "WEEK",
            PartitionBy::Month => "MONTH",
            PartitionBy::Year => "YEAR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Display for TtlUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TtlUnit::Hours => "HOURS",
            TtlUnit::Days => "DAYS",
            TtlUnit::Weeks => "WEEKS",
            TtlUnit::Months => "MONTHS",
            TtlUnit::Years => "YEARS",
        })
    }
}

/// How long partitions are retained before the engine drops them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Ttl {
    pub amount: u32,
    pub unit: TtlUnit,
}

impl Display for Ttl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Table parameters governing out-of-order ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestionTuning {
    pub max_uncommitted_rows: Option<u32>,
    /// A duration such as `1s` or `500T`
    pub o3_max_lag: Option<String>,
}

impl IngestionTuning {
    pub fn is_empty(&self) -> bool {
        self.max_uncommitted_rows.is_none() && self.o3_max_lag.is_none()
    }
}

/// The shape of a table: its columns in declaration order and its storage settings.
///
/// Built once (through [TableDescriptor::builder] or deserialization) and shared as
/// `Arc<TableDescriptor>`; builders read it but never change it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TableDefinition")]
pub struct TableDescriptor {
    name: String,
    columns: IndexMap<String, ColumnDescriptor>,
    partition_by: PartitionBy,
    wal: Option<bool>,
    dedup_keys: Vec<String>,
    ttl: Option<Ttl>,
    tuning: IngestionTuning,
}

impl TableDescriptor {
    pub fn builder(name: impl Into<String>) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            name: name.into(),
            columns: vec![],
            partition_by: PartitionBy::None,
            wal: None,
            dedup_keys: vec![],
            ttl: None,
            tuning: IngestionTuning::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The name of the designated timestamp column, if any
    pub fn designated_timestamp(&self) -> Option<&str> {
        self.columns()
            .find(|(_, column)| column.is_designated())
            .map(|(name, _)| name)
    }

    pub fn partition_by(&self) -> PartitionBy {
        self.partition_by
    }

    /// `Some(true)` for WAL, `Some(false)` for BYPASS WAL, `None` for the engine default
    pub fn wal(&self) -> Option<bool> {
        self.wal
    }

    pub fn dedup_keys(&self) -> &[String] {
        &self.dedup_keys
    }

    pub fn ttl(&self) -> Option<Ttl> {
        self.ttl
    }

    pub fn tuning(&self) -> &IngestionTuning {
        &self.tuning
    }
}

pub struct TableDescriptorBuilder {
    name: String,
    columns: Vec<(String, ColumnDescriptor)>,
    partition_by: PartitionBy,
    wal: Option<bool>,
    dedup_keys: Vec<String>,
    ttl: Option<Ttl>,
    tuning: IngestionTuning,
}

impl TableDescriptorBuilder {
    pub fn column(mut self, name: impl Into<String>, column: ColumnDescriptor) -> Self {
        self.columns.push((name.into(), column));
        self
    }

    pub fn partition_by(mut self, partition_by: PartitionBy) -> Self {
        self.partition_by = partition_by;
        self
    }

    pub fn wal(mut self, wal: bool) -> Self {
        self.wal = Some(wal);
        self
    }

    pub fn dedup_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.dedup_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn ttl(mut self, amount: u32, unit: TtlUnit) -> Self {
        self.ttl = Some(Ttl { amount, unit });
        self
    }

    pub fn max_uncommitted_rows(mut self, rows: u32) -> Self {
        self.tuning.max_uncommitted_rows = Some(rows);
        self
    }

    pub fn o3_max_lag(mut self, lag: impl Into<String>) -> Self {
        self.tuning.o3_max_lag = Some(lag.into());
        self
    }

    pub fn build(self) -> Result<Arc<TableDescriptor>, SqlError> {
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, column) in self.columns {
            if columns.contains_key(&name) {
                return Err(SqlError::validation(format!(
                    "Table `{}` declares column `{name}` more than once",
                    self.name
                )));
            }
            columns.insert(name, column);
        }

        let descriptor = TableDescriptor {
            name: self.name,
            columns,
            partition_by: self.partition_by,
            wal: self.wal,
            dedup_keys: self.dedup_keys,
            ttl: self.ttl,
            tuning: self.tuning,
        };
        validate(&descriptor)?;

        Ok(Arc::new(descriptor))
    }
}

fn validate(table: &TableDescriptor) -> Result<(), SqlError> {
    let name = &table.name;

    if name.is_empty() {
        return Err(SqlError::validation("Table name cannot be empty"));
    }
    if table.columns.is_empty() {
        return Err(SqlError::validation(format!("Table `{name}` must have at least one column")));
    }

    for (column_name, column) in table.columns() {
        column.validate(column_name)?;
    }

    let designated: Vec<_> = table
        .columns()
        .filter(|(_, column)| column.is_designated())
        .map(|(column_name, _)| column_name)
        .collect();
    if designated.len() > 1 {
        return Err(SqlError::validation(format!(
            "Table `{name}` has more than one designated timestamp: {}",
            designated.join(", ")
        )));
    }
    let designated = designated.first().copied();

    if table.partition_by != PartitionBy::None && designated.is_none() {
        return Err(SqlError::validation(format!(
            "Table `{name}` is partitioned by {} but has no designated timestamp",
            table.partition_by
        )));
    }

    if table.wal == Some(true) && table.partition_by == PartitionBy::None {
        return Err(SqlError::validation(format!("Table `{name}` must be partitioned to use WAL")));
    }

    if !table.dedup_keys.is_empty() {
        let mut seen = HashSet::new();
        for key in &table.dedup_keys {
            if table.column(key).is_none() {
                return Err(SqlError::validation(format!(
                    "Deduplication key `{key}` is not a column of table `{name}`"
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(SqlError::validation(format!(
                    "Deduplication key `{key}` is listed more than once"
                )));
            }
        }
        match designated {
            Some(ts) if seen.contains(ts) => {}
            _ => {
                return Err(SqlError::validation(format!(
                    "Deduplication keys of table `{name}` must include the designated timestamp"
                )));
            }
        }
        if table.wal == Some(false) || table.partition_by == PartitionBy::None {
            return Err(SqlError::validation(format!(
                "Table `{name}` cannot deduplicate without WAL"
            )));
        }
    }

    if let Some(ttl) = table.ttl {
        if ttl.amount == 0 {
            return Err(SqlError::validation(format!("TTL of table `{name}` must be positive")));
        }
        if table.partition_by == PartitionBy::None {
            return Err(SqlError::validation(format!(
                "Table `{name}` must be partitioned to have a TTL"
            )));
        }
    }

    if let Some(lag) = &table.tuning.o3_max_lag {
        literal::validate_duration("o3MaxLag", lag)?;
    }

    Ok(())
}

/// The serialized form of a table
#[derive(Deserialize)]
struct TableDefinition {
    name: String,
    columns: IndexMap<String, ColumnDescriptor>,
    #[serde(default)]
    partition_by: PartitionBy,
    #[serde(default)]
    wal: Option<bool>,
    #[serde(default)]
    dedup_keys: Vec<String>,
    #[serde(default)]
    ttl: Option<Ttl>,
    #[serde(default)]
    tuning: IngestionTuning,
}

impl TryFrom<TableDefinition> for TableDescriptor {
    type Error = SqlError;

    fn try_from(definition: TableDefinition) -> Result<Self, Self::Error> {
        let descriptor = TableDescriptor {
            name: definition.name,
            columns: definition.columns,
            partition_by: definition.partition_by,
            wal: definition.wal,
            dedup_keys: definition.dedup_keys,
            ttl: definition.ttl,
            tuning: definition.tuning,
        };
        validate(&descriptor)?;
        Ok(descriptor)
    }
}
