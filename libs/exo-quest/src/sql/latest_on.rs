// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder};

/// The latest row per partition key, by a timestamp column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestOn {
    pub timestamp: String,
    pub partition_by: Vec<String>,
}

impl ExpressionBuilder for LatestOn {
    /// Build expression of the form `LATEST ON <ts> PARTITION BY <col>, ...`
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        if self.partition_by.is_empty() {
            return Err(SqlError::validation("LATEST ON requires at least one PARTITION BY column"));
        }

        builder.push_str("LATEST ON ");
        builder.push_identifier(&self.timestamp);
        builder.push_str(" PARTITION BY ");
        builder.push_identifiers(&self.partition_by);
        Ok(())
    }
}
