// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// Typed construction of SQL for QuestDB's text endpoint.
///
/// Statements are built as values ([SelectNode], [InsertNode], [UpdateNode]) made of
/// [SqlExpr] trees and rendered to text through [ExpressionBuilder]. There are no
/// placeholders: the endpoint only accepts SQL text, so every literal goes through the
/// per-type formatter in [literal], which is the only place values turn into SQL.
///
/// Most callers use the builders instead of the nodes directly. [SelectBuilder] is
/// copy-on-write (each call returns a fresh builder), while [InsertBuilder] and
/// [UpdateBuilder] accumulate in place. All of them take a shared [TableDescriptor], which
/// supplies declared column types to the column facade ([TableColumns], [ColumnRef]) so
/// literals are formatted per the column's type rather than guessed from the value.
///
/// I/O is delegated to a [Transport]. Responses come back as [RawResponse] and are
/// decoded into [Row]s by [parse_rows], using the wire types reported by the engine.
#[macro_use]
mod sql;
mod builder;
mod client;
mod result;
mod schema;
mod transport;
mod value;

pub mod error;

pub use builder::{
    insert::{InsertBuilder, InsertRow},
    select::SelectBuilder,
    update::UpdateBuilder,
};
pub use client::Client;
pub use error::{SqlError, WithContext};
pub use result::{
    coerce::coerce,
    response::{ColumnMeta, RawResponse},
    rows::{Row, parse_rows},
};
pub use schema::{
    column_spec::{ColumnDescriptor, ColumnMetadata, SymbolOptions},
    ddl_type::ddl_type,
    op::{AlterTableOp, SchemaOp},
    table_spec::{
        IngestionTuning, PartitionBy, TableDescriptor, TableDescriptorBuilder, Ttl, TtlUnit,
    },
};
pub use sql::{
    ExpressionBuilder, SQLBuilder,
    column::{ColumnRef, TableColumns},
    column_type::ColumnType,
    expr::{BinaryOp, SqlExpr, UnaryOp},
    function::{FunctionCall, aggregate, count_star, function},
    insert::{InsertCell, InsertNode},
    join::{Join, JoinKind},
    latest_on::LatestOn,
    limit::Limit,
    literal::{self, escape_identifier, escape_string, format_literal},
    order::{OrderBy, OrderByElement, Ordering},
    predicate::{and, not, or},
    sample_by::{AlignTo, Fill, SampleBy},
    select::{Projection, SelectNode},
    table::Source,
    update::{Assignment, UpdateNode},
};
pub use transport::{Transport, TransportError};
pub use value::Value;
