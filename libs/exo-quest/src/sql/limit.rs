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

/// A limit clause. A negative count takes rows from the end of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: i64,
    pub offset: Option<i64>,
}

impl ExpressionBuilder for Limit {
    /// Build expression of the form `LIMIT <count>[, <offset>]`
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        builder.push_str("LIMIT ");
        builder.push_str(self.count.to_string());
        if let Some(offset) = self.offset {
            builder.push_str(", ");
            builder.push_str(offset.to_string());
        }
        Ok(())
    }
}
