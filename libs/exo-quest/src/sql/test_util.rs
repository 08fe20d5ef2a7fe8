// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

//! Test assertions to check rendered SQL.

/// Assert that an expression renders to the expected SQL text.
///
/// # Usage:
/// ```no_run
/// assert_sql!(expr, "SELECT *\nFROM t");
/// ```
macro_rules! assert_sql {
    ($actual:expr, $expected_stmt:expr) => {
        let actual_stmt = $crate::ExpressionBuilder::to_sql(&$actual).unwrap();
        assert_eq!(actual_stmt, $expected_stmt);
    };
}

/// Assert that rendering an expression fails with an error matching the given pattern.
macro_rules! assert_sql_err {
    ($actual:expr, $pattern:pat) => {
        match $crate::ExpressionBuilder::to_sql(&$actual) {
            Err($pattern) => {}
            other => panic!("Unexpected rendering: {other:?}"),
        }
    };
}
