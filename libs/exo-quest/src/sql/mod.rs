// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[cfg(test)]
#[macro_use]
pub(crate) mod test_util;

mod expression_builder;
mod sql_builder;

pub mod column;
pub mod column_type;
pub mod expr;
pub mod function;
pub mod insert;
pub mod join;
pub mod latest_on;
pub mod limit;
pub mod literal;
pub mod order;
pub mod predicate;
pub mod sample_by;
pub mod select;
pub mod table;
pub mod update;

pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
