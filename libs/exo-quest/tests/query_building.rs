// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Datelike;
use exo_quest::{
    AlignTo, AlterTableOp, Client, ColumnDescriptor, ColumnType, Fill, InsertRow, Ordering,
    PartitionBy, RawResponse, SampleBy, SelectBuilder, SqlError, SqlExpr, TableDescriptor,
    Transport, TransportError, Value, aggregate, and, coerce, escape_identifier,
};
use num_bigint::BigInt;

/// Records every statement and answers each with the same response
struct RecordingTransport {
    statements: Mutex<Vec<String>>,
    response: Result<RawResponse, u16>,
}

impl RecordingTransport {
    fn answering(response: &str) -> Arc<Self> {
        Arc::new(Self {
            statements: Mutex::new(vec![]),
            response: Ok(serde_json::from_str(response).unwrap()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            statements: Mutex::new(vec![]),
            response: Err(status),
        })
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, sql: &str) -> Result<RawResponse, TransportError> {
        self.statements.lock().unwrap().push(sql.to_string());

        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(status) => Err(TransportError::Server {
                status: *status,
                message: "table does not exist".into(),
                position: Some(14),
                sql: sql.to_string(),
            }),
        }
    }
}

fn readings() -> Arc<TableDescriptor> {
    TableDescriptor::builder("readings")
        .column("ts", ColumnDescriptor::designated_timestamp())
        .column("source", ColumnDescriptor::symbol())
        .column("kwh", ColumnDescriptor::new(ColumnType::Double))
        .column("meter", ColumnDescriptor::new(ColumnType::Long))
        .partition_by(PartitionBy::Day)
        .wal(true)
        .build()
        .unwrap()
}

#[test]
fn select_star_and_filter() {
    let table = readings();

    assert_eq!(
        SelectBuilder::new(&table).to_sql().unwrap(),
        "SELECT *\nFROM readings"
    );
    assert_eq!(
        SelectBuilder::new(&table)
            .where_with(|t| t.col("source").eq("solar"))
            .to_sql()
            .unwrap(),
        "SELECT *\nFROM readings\nWHERE (source = 'solar')"
    );
}

#[test]
fn sibling_builders_are_independent() {
    let table = readings();
    let base = SelectBuilder::new(&table);
    let solar = base.where_with(|t| t.col("source").eq("solar"));
    let wind = base.where_with(|t| t.col("source").eq("wind"));
    let newest_solar = solar.order_by("ts", Ordering::Desc);

    assert_eq!(base.to_sql().unwrap(), "SELECT *\nFROM readings");
    assert_eq!(
        solar.to_sql().unwrap(),
        "SELECT *\nFROM readings\nWHERE (source = 'solar')"
    );
    assert_eq!(
        wind.to_sql().unwrap(),
        "SELECT *\nFROM readings\nWHERE (source = 'wind')"
    );
    assert_eq!(
        newest_solar.to_sql().unwrap(),
        "SELECT *\nFROM readings\nWHERE (source = 'solar')\nORDER BY ts DESC"
    );
}

#[test]
fn and_is_left_associative() {
    let exprs = ["a", "b", "c", "d"].map(|name| SqlExpr::column(name).and(SqlExpr::raw("true")));
    let select = SelectBuilder::unbound("t").where_(and(exprs).unwrap());

    assert_eq!(
        select.to_sql().unwrap(),
        "SELECT *\nFROM t\n\
         WHERE ((((a AND true) AND (b AND true)) AND (c AND true)) AND (d AND true))"
    );
    assert!(matches!(and(Vec::<SqlExpr>::new()), Err(SqlError::ArgumentCount(_))));
}

#[test]
fn identifier_escaping() {
    assert_eq!(escape_identifier("kwh"), "kwh");
    assert_eq!(escape_identifier("my table"), "\"my table\"");
    // Escaping is not idempotent: an escaped name is quoted again
    assert_eq!(escape_identifier("\"my table\""), "\"\"\"my table\"\"\"");
}

#[test]
fn sample_by_rejects_star_for_every_fill_and_alignment() {
    let table = readings();
    let fills = [
        vec![],
        vec![Fill::None],
        vec![Fill::Null],
        vec![Fill::Prev],
        vec![Fill::Linear],
        vec![Fill::Value(0.0)],
    ];
    let alignments = [
        None,
        Some(AlignTo::calendar()),
        Some(AlignTo::FirstObservation),
    ];

    for fill in &fills {
        for align in &alignments {
            let mut sample_by = SampleBy::new("1h").fill(fill.clone());
            if let Some(align) = align {
                sample_by = sample_by.align_to(align.clone());
            }

            let select = SelectBuilder::new(&table).sample_by(sample_by.clone());
            assert!(matches!(select.to_sql(), Err(SqlError::Validation(_))));

            let projected = select.select_expr(aggregate("sum", [SqlExpr::column("kwh")]));
            assert!(projected.to_sql().is_ok());
        }
    }
}

#[test]
fn null_cells_decode_to_null() {
    for wire_type in ["BOOLEAN", "LONG", "TIMESTAMP", "SYMBOL", "GEOHASH(8c)", "?"] {
        assert_eq!(
            coerce(&serde_json::Value::Null, wire_type).unwrap(),
            Value::Null
        );
    }
}

#[test]
fn timestamp_year_decodes() {
    let value = coerce(
        &serde_json::Value::String("1999-12-31T23:59:59.999999Z".into()),
        "TIMESTAMP",
    )
    .unwrap();
    assert_eq!(value.as_timestamp().map(|ts| ts.year()), Some(1999));
}

#[tokio::test]
async fn empty_insert_fails_without_io() {
    let transport = RecordingTransport::answering(r#"{"dml": "OK"}"#);
    let client = Client::new(transport.clone());

    let result = client.insert(&readings()).execute(transport.as_ref()).await;
    assert!(matches!(result, Err(SqlError::Validation(_))));
    assert!(transport.statements().is_empty());
}

#[tokio::test]
async fn insert_injects_now_for_designated_timestamp() {
    let transport = RecordingTransport::answering(r#"{"dml": "OK"}"#);
    let client = Client::new(transport.clone());

    let mut insert = client.insert(&readings());
    insert
        .row(InsertRow::new().set("source", "solar").set("kwh", 2.5))
        .unwrap();
    insert.execute(client.transport()).await.unwrap();

    assert_eq!(
        transport.statements(),
        vec!["INSERT INTO readings (ts, source, kwh) VALUES\n(now(), 'solar', 2.5)".to_string()]
    );
}

#[tokio::test]
async fn wide_integers_round_trip() {
    // 2^63 - 1 does not survive a trip through a double
    let wide = "9223372036854775807";
    let transport = RecordingTransport::answering(&format!(
        r#"{{
            "columns": [{{"name": "meter", "type": "LONG"}}],
            "dataset": [[{wide}]],
            "count": 1
        }}"#
    ));

    let table = readings();
    let rows = SelectBuilder::new(&table)
        .columns(&["meter"])
        .execute(transport.as_ref())
        .await
        .unwrap();
    let meter = rows[0]["meter"].clone();
    assert_eq!(meter, Value::BigInt(wide.parse::<BigInt>().unwrap()));

    // And back out as a literal, digit for digit
    let select = SelectBuilder::new(&table).where_with(|t| t.col("meter").eq(meter));
    assert_eq!(
        select.to_sql().unwrap(),
        format!("SELECT *\nFROM readings\nWHERE (meter = {wide})")
    );
}

#[tokio::test]
async fn first_limits_to_one_row() {
    let transport = RecordingTransport::answering(
        r#"{
            "columns": [{"name": "ts", "type": "TIMESTAMP"}, {"name": "kwh", "type": "DOUBLE"}],
            "dataset": [["2024-03-01T12:00:00.000000Z", 4.5]],
            "count": 1
        }"#,
    );

    let row = SelectBuilder::new(&readings())
        .order_by("ts", Ordering::Desc)
        .first(transport.as_ref())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row["kwh"], Value::Float(4.5));
    assert_eq!(
        transport.statements(),
        vec!["SELECT *\nFROM readings\nORDER BY ts DESC\nLIMIT 1".to_string()]
    );
}

#[tokio::test]
async fn first_keeps_the_offset() {
    let transport = RecordingTransport::answering(
        r#"{"columns": [{"name": "kwh", "type": "DOUBLE"}], "dataset": [], "count": 0}"#,
    );

    let row = SelectBuilder::new(&readings())
        .columns(&["kwh"])
        .limit_offset(10, 20)
        .first(transport.as_ref())
        .await
        .unwrap();

    assert_eq!(row, None);
    assert_eq!(
        transport.statements(),
        vec!["SELECT kwh\nFROM readings\nLIMIT 1, 20".to_string()]
    );
}

#[tokio::test]
async fn schema_statements_go_through_the_transport() {
    let transport = RecordingTransport::answering(r#"{"ddl": "OK"}"#);
    let client = Client::new(transport.clone());
    let table = readings();

    client.create_table(&table, true).await.unwrap();
    client
        .alter_table(
            &table,
            AlterTableOp::DropPartitions(vec!["2024-01-01".into()]),
        )
        .await
        .unwrap();
    client.truncate_table(&table).await.unwrap();
    client.drop_table(&table, true).await.unwrap();

    assert_eq!(
        transport.statements(),
        vec![
            "CREATE TABLE IF NOT EXISTS readings (ts TIMESTAMP, source SYMBOL, kwh DOUBLE, meter LONG) \
             timestamp(ts) PARTITION BY DAY WAL"
                .to_string(),
            "ALTER TABLE readings DROP PARTITION LIST '2024-01-01'".to_string(),
            "TRUNCATE TABLE readings".to_string(),
            "DROP TABLE IF EXISTS readings".to_string(),
        ]
    );
}

#[tokio::test]
async fn invalid_schema_operations_send_nothing() {
    let transport = RecordingTransport::answering(r#"{"ddl": "OK"}"#);
    let client = Client::new(transport.clone());

    let result = client
        .alter_table(&readings(), AlterTableOp::DropPartitions(vec![]))
        .await;
    assert!(matches!(result, Err(SqlError::Validation(_))));
    assert!(transport.statements().is_empty());
}

#[tokio::test]
async fn transport_errors_surface_unchanged() {
    let transport = RecordingTransport::failing(400);
    let client = Client::new(transport.clone());

    let result = client.select(&readings()).execute(client.transport()).await;
    match result {
        Err(SqlError::Transport(TransportError::Server {
            status, position, ..
        })) => {
            assert_eq!(status, 400);
            assert_eq!(position, Some(14));
        }
        other => panic!("Unexpected result: {other:?}"),
    }

    let result = client.execute_raw("SELECT 1").await;
    assert!(matches!(result, Err(SqlError::Transport(_))));
}
