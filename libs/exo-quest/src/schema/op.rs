// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    ColumnDescriptor, PartitionBy, SQLBuilder, SqlError, TableDescriptor, Ttl, ddl_type,
    sql::literal,
};

/// A change to an existing table
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableOp {
    AddColumn {
        name: String,
        column: ColumnDescriptor,
    },
    DropColumn {
        name: String,
    },
    RenameColumn {
        from: String,
        to: String,
    },
    SetTtl(Ttl),
    SetMaxUncommittedRows(u32),
    /// A duration such as `1s`
    SetO3MaxLag(String),
    /// Partition names such as `2024-01-01` (for day partitioning)
    DropPartitions(Vec<String>),
    DetachPartitions(Vec<String>),
    AttachPartitions(Vec<String>),
    SquashPartitions,
    /// Resume a suspended WAL table, optionally skipping to a transaction
    ResumeWal {
        from_txn: Option<u64>,
    },
}

/// A DDL statement against one table. Each renders to a single independent statement.
#[derive(Debug)]
pub enum SchemaOp<'a> {
    CreateTable {
        table: &'a TableDescriptor,
        if_not_exists: bool,
    },
    AlterTable {
        table: &'a TableDescriptor,
        op: AlterTableOp,
    },
    DropTable {
        table: &'a TableDescriptor,
        if_exists: bool,
    },
    TruncateTable {
        table: &'a TableDescriptor,
    },
}

impl SchemaOp<'_> {
    pub fn to_sql(&self) -> Result<String, SqlError> {
        let mut builder = SQLBuilder::new();

        match self {
            SchemaOp::CreateTable {
                table,
                if_not_exists,
            } => create_table(table, *if_not_exists, &mut builder)?,
            SchemaOp::AlterTable { table, op } => alter_table(table, op, &mut builder)?,
            SchemaOp::DropTable { table, if_exists } => {
                builder.push_str("DROP TABLE ");
                if *if_exists {
                    builder.push_str("IF EXISTS ");
                }
                builder.push_identifier(table.name());
            }
            SchemaOp::TruncateTable { table } => {
                builder.push_str("TRUNCATE TABLE ");
                builder.push_identifier(table.name());
            }
        }

        Ok(builder.into_sql())
    }
}

fn create_table(
    table: &TableDescriptor,
    if_not_exists: bool,
    builder: &mut SQLBuilder,
) -> Result<(), SqlError> {
    builder.push_str("CREATE TABLE ");
    if if_not_exists {
        builder.push_str("IF NOT EXISTS ");
    }
    builder.push_identifier(table.name());
    builder.push_str(" (");
    builder.push_iter(table.columns(), ", ", |builder, (name, column)| {
        builder.push_identifier(name);
        builder.push_space();
        builder.push_str(ddl_type(column)?);
        Ok(())
    })?;
    builder.push(')');

    if let Some(ts) = table.designated_timestamp() {
        builder.push_str(" timestamp(");
        builder.push_identifier(ts);
        builder.push(')');
    }

    builder.push_str(" PARTITION BY ");
    builder.push_str(table.partition_by().to_string());

    if let Some(ttl) = table.ttl() {
        builder.push_str(" TTL ");
        builder.push_str(ttl.to_string());
    }

    match table.wal() {
        Some(true) => builder.push_str(" WAL"),
        Some(false) => builder.push_str(" BYPASS WAL"),
        None => {}
    }

    if !table.dedup_keys().is_empty() {
        builder.push_str(" DEDUP UPSERT KEYS(");
        builder.push_identifiers(table.dedup_keys());
        builder.push(')');
    }

    let tuning = table.tuning();
    if !tuning.is_empty() {
        let mut params = vec![];
        if let Some(rows) = tuning.max_uncommitted_rows {
            params.push(format!("maxUncommittedRows={rows}"));
        }
        if let Some(lag) = &tuning.o3_max_lag {
            literal::validate_duration("o3MaxLag", lag)?;
            params.push(format!("o3MaxLag={lag}"));
        }
        builder.push_str(" WITH ");
        builder.push_str(params.join(", "));
    }

    Ok(())
}

fn alter_table(
    table: &TableDescriptor,
    op: &AlterTableOp,
    builder: &mut SQLBuilder,
) -> Result<(), SqlError> {
    let table_name = table.name();

    builder.push_str("ALTER TABLE ");
    builder.push_identifier(table_name);
    builder.push_space();

    match op {
        AlterTableOp::AddColumn { name, column } => {
            if column.is_designated() {
                return Err(SqlError::validation(format!(
                    "Column `{name}` cannot be added as a designated timestamp; designate it when creating `{table_name}`"
                )));
            }
            if table.column(name).is_some() {
                return Err(SqlError::validation(format!(
                    "Column `{name}` already exists in `{table_name}`"
                )));
            }
            column.validate(name)?;

            builder.push_str("ADD COLUMN ");
            builder.push_identifier(name);
            builder.push_space();
            builder.push_str(ddl_type(column)?);
        }
        AlterTableOp::DropColumn { name } => {
            if table.designated_timestamp() == Some(name.as_str()) {
                return Err(SqlError::validation(format!(
                    "The designated timestamp `{name}` of `{table_name}` cannot be dropped"
                )));
            }
            existing_column(table, name)?;

            builder.push_str("DROP COLUMN ");
            builder.push_identifier(name);
        }
        AlterTableOp::RenameColumn { from, to } => {
            existing_column(table, from)?;
            if table.column(to).is_some() {
                return Err(SqlError::validation(format!(
                    "Column `{to}` already exists in `{table_name}`"
                )));
            }

            builder.push_str("RENAME COLUMN ");
            builder.push_identifier(from);
            builder.push_str(" TO ");
            builder.push_identifier(to);
        }
        AlterTableOp::SetTtl(ttl) => {
            if ttl.amount == 0 {
                return Err(SqlError::validation("TTL must be positive"));
            }
            if table.partition_by() == PartitionBy::None {
                return Err(SqlError::validation(format!(
                    "Table `{table_name}` must be partitioned to have a TTL"
                )));
            }

            builder.push_str("SET TTL ");
            builder.push_str(ttl.to_string());
        }
        AlterTableOp::SetMaxUncommittedRows(rows) => {
            builder.push_str("SET PARAM maxUncommittedRows = ");
            builder.push_str(rows.to_string());
        }
        AlterTableOp::SetO3MaxLag(lag) => {
            literal::validate_duration("o3MaxLag", lag)?;

            builder.push_str("SET PARAM o3MaxLag = ");
            builder.push_str(lag);
        }
        AlterTableOp::DropPartitions(partitions) => {
            partition_list("DROP", table, partitions, builder)?
        }
        AlterTableOp::DetachPartitions(partitions) => {
            partition_list("DETACH", table, partitions, builder)?
        }
        AlterTableOp::AttachPartitions(partitions) => {
            partition_list("ATTACH", table, partitions, builder)?
        }
        AlterTableOp::SquashPartitions => {
            builder.push_str("SQUASH PARTITIONS");
        }
        AlterTableOp::ResumeWal { from_txn } => {
            if table.wal() == Some(false) {
                return Err(SqlError::validation(format!("Table `{table_name}` does not use WAL")));
            }

            builder.push_str("RESUME WAL");
            if let Some(txn) = from_txn {
                builder.push_str(" FROM TXN ");
                builder.push_str(txn.to_string());
            }
        }
    }

    Ok(())
}

fn existing_column<'a>(
    table: &'a TableDescriptor,
    name: &str,
) -> Result<&'a ColumnDescriptor, SqlError> {
    table.column(name).ok_or_else(|| {
        SqlError::validation(format!("Column `{name}` does not exist in `{}`", table.name()))
    })
}

fn partition_list(
    action: &str,
    table: &TableDescriptor,
    partitions: &[String],
    builder: &mut SQLBuilder,
) -> Result<(), SqlError> {
    if partitions.is_empty() {
        return Err(SqlError::validation(format!(
            "{action} PARTITION requires at least one partition"
        )));
    }
    if table.partition_by() == PartitionBy::None {
        return Err(SqlError::validation(format!("Table `{}` is not partitioned", table.name())));
    }

    builder.push_str(action);
    builder.push_str(" PARTITION LIST ");
    builder.push_iter(partitions.iter(), ", ", |builder, partition| {
        builder.push_string_literal(partition);
        Ok(())
    })
}
