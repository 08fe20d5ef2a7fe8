// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder, select::SelectNode};

/// The source of rows in a FROM or JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table {
        name: String,
        alias: Option<String>,
    },
    /// A nested select. The engine requires it to be aliased.
    Subquery {
        select: Box<SelectNode>,
        alias: String,
    },
}

impl Source {
    pub fn table(name: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased_table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn subquery(select: SelectNode, alias: impl Into<String>) -> Self {
        Source::Subquery {
            select: Box::new(select),
            alias: alias.into(),
        }
    }

    /// The name columns of this source are qualified with: the alias if there is one,
    /// otherwise the table name
    pub fn qualifier(&self) -> &str {
        match self {
            Source::Table { name, alias } => alias.as_deref().unwrap_or(name),
            Source::Subquery { alias, .. } => alias,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Source::Table { alias, .. } => alias.as_deref(),
            Source::Subquery { alias, .. } => Some(alias),
        }
    }
}

impl ExpressionBuilder for Source {
    /// Build expression of the form `<table> [<alias>]` or `(<select>) <alias>`
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        match self {
            Source::Table { name, alias } => {
                builder.push_identifier(name);
                if let Some(alias) = alias {
                    builder.push_space();
                    builder.push_identifier(alias);
                }
            }
            Source::Subquery { select, alias } => {
                builder.push('(');
                select.build(builder)?;
                builder.push_str(") ");
                builder.push_identifier(alias);
            }
        }
        Ok(())
    }
}
