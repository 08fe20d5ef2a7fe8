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
    AlterTableOp, InsertBuilder, RawResponse, SchemaOp, SelectBuilder, SqlError, TableDescriptor,
    Transport, UpdateBuilder,
};

/// A transport paired with statement entry points.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn select(&self, table: &Arc<TableDescriptor>) -> SelectBuilder {
        SelectBuilder::new(table)
    }

    pub fn insert(&self, table: &Arc<TableDescriptor>) -> InsertBuilder {
        InsertBuilder::new(table)
    }

    pub fn update(&self, table: &Arc<TableDescriptor>) -> UpdateBuilder {
        UpdateBuilder::new(table)
    }

    pub async fn create_table(
        &self,
        table: &TableDescriptor,
        if_not_exists: bool,
    ) -> Result<RawResponse, SqlError> {
        self.execute_schema_op(SchemaOp::CreateTable {
            table,
            if_not_exists,
        })
        .await
    }

    pub async fn alter_table(
        &self,
        table: &TableDescriptor,
        op: AlterTableOp,
    ) -> Result<RawResponse, SqlError> {
        self.execute_schema_op(SchemaOp::AlterTable { table, op })
            .await
    }

    pub async fn drop_table(
        &self,
        table: &TableDescriptor,
        if_exists: bool,
    ) -> Result<RawResponse, SqlError> {
        self.execute_schema_op(SchemaOp::DropTable { table, if_exists })
            .await
    }

    pub async fn truncate_table(&self, table: &TableDescriptor) -> Result<RawResponse, SqlError> {
        self.execute_schema_op(SchemaOp::TruncateTable { table })
            .await
    }

    /// Send SQL text as is
    pub async fn execute_raw(&self, sql: &str) -> Result<RawResponse, SqlError> {
        debug!("Executing raw SQL: {}", sql);
        Ok(self.transport.execute(sql).await?)
    }

    async fn execute_schema_op(&self, op: SchemaOp<'_>) -> Result<RawResponse, SqlError> {
        let sql = op.to_sql()?;
        debug!("Executing schema operation: {}", sql);

        Ok(self.transport.execute(&sql).await?)
    }
}
