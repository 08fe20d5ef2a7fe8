// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// A column of a query result, as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// The engine's type name, such as `TIMESTAMP` or `GEOHASH(8c)`
    #[serde(rename = "type")]
    pub wire_type: String,
}

/// The decoded body of a successful `/exec` call.
///
/// Queries carry `columns` and rows (`dataset` on the wire); DDL and DML statements carry
/// `ddl`/`dml` and, for updates, the number of `updated` rows. Cells are kept as JSON until
/// [parse_rows](crate::parse_rows) decodes them against their column types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnMeta>>,
    #[serde(default, alias = "dataset", skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response() {
        let response: RawResponse = serde_json::from_str(
            r#"{
                "query": "SELECT * FROM t",
                "columns": [{"name": "ts", "type": "TIMESTAMP"}, {"name": "v", "type": "LONG"}],
                "timestamp": 0,
                "dataset": [["2024-01-01T00:00:00.000000Z", 12345678901234567890]],
                "count": 1
            }"#,
        )
        .unwrap();

        assert_eq!(response.count, Some(1));
        assert_eq!(
            response
                .columns
                .as_ref()
                .map(|columns| columns[1].wire_type.as_str()),
            Some("LONG")
        );
        // Wide integers keep their original text
        assert_eq!(
            response.rows.unwrap()[0][1].to_string(),
            "12345678901234567890"
        );
    }

    #[test]
    fn ddl_response() {
        let response: RawResponse = serde_json::from_str(r#"{"ddl": "OK"}"#).unwrap();
        assert_eq!(response.ddl.as_deref(), Some("OK"));
        assert!(response.columns.is_none());
        assert!(response.rows.is_none());
    }
}
