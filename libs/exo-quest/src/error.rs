// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::{ColumnType, TransportError};

#[derive(Error, Debug)]
pub enum SqlError {
    /// A variadic combinator (such as `and`/`or`) was called without arguments
    #[error("`{0}` requires at least one expression")]
    ArgumentCount(&'static str),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Binary values cannot be rendered as SQL literals; use a bulk import instead")]
    BinaryLiteral,

    #[error("Cannot format {value} as {column_type}: {reason}")]
    LiteralMismatch {
        column_type: ColumnType,
        value: String,
        reason: String,
    },

    #[error("Failed to decode {value} as {wire_type}: {reason}")]
    Decode {
        wire_type: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<SqlError>),
}

impl SqlError {
    pub fn with_context(self, context: String) -> SqlError {
        SqlError::WithContext(context, Box::new(self))
    }

    pub(crate) fn validation(message: impl Into<String>) -> SqlError {
        SqlError::Validation(message.into())
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, SqlError> {
    fn with_context(self, context: String) -> Result<T, SqlError> {
        self.map_err(|e| e.with_context(context))
    }
}
