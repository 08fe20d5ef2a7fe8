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

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Ordering {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement(pub SqlExpr, pub Ordering);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBy(pub Vec<OrderByElement>);

impl OrderBy {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, element: OrderByElement) {
        self.0.push(element);
    }
}

impl ExpressionBuilder for OrderByElement {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        self.0.build(builder)?;
        builder.push_space();

        if self.1 == Ordering::Asc {
            builder.push_str("ASC");
        } else {
            builder.push_str("DESC");
        }
        Ok(())
    }
}

impl ExpressionBuilder for OrderBy {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        builder.push_str("ORDER BY ");
        builder.push_elems(&self.0, ", ")
    }
}
