//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::SeaTableErrorCode;
use crate::metadata::parse_metadata;
use crate::query_request::{build_sql, filter_display_rows, parse_sql_response};
use crate::row_mapper::map_rows;
use crate::rows_request::RowsEnvelope;
use crate::types::{Column, ColumnType, RawRow, TableSchema};
use crate::update_request::UpdateOutcome;
use serde_json::json;
use std::error::Error;
use std::result::Result;

#[test]
fn test_build_sql() {
    assert_eq!(
        build_sql("Mentors", "0aZx", "Active"),
        "SELECT * FROM `Mentors` WHERE `0aZx` = 'Active'"
    );
    // quotes in the value cannot end the literal
    assert_eq!(
        build_sql("Mentors", "k", "O'Brien"),
        "SELECT * FROM `Mentors` WHERE `k` = 'O''Brien'"
    );
    assert_eq!(
        build_sql("odd`name", "k", "x"),
        "SELECT * FROM `odd``name` WHERE `k` = 'x'"
    );
}

#[test]
fn test_sql_response() -> Result<(), Box<dyn Error>> {
    let rows = parse_sql_response(json!({"results": [{"_id": "a"}, {"_id": "b"}], "metadata": []}))?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].id(), Some("b"));

    assert!(parse_sql_response(json!({"results": []}))?.is_empty());
    assert!(parse_sql_response(json!({}))?.is_empty());

    let e = parse_sql_response(json!({"success": false, "error_message": "no such column"}))
        .unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::QueryFailed);
    assert!(e.message.contains("no such column"));

    let e = parse_sql_response(json!({"error_message": "syntax error"})).unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::QueryFailed);

    let e = parse_sql_response(json!({"results": "nope"})).unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::QueryFailed);
    Ok(())
}

#[test]
fn test_rows_envelope() -> Result<(), Box<dyn Error>> {
    let bare: RowsEnvelope = serde_json::from_value(json!([{"_id": "a"}]))?;
    assert_eq!(bare.into_rows().len(), 1);
    let wrapped: RowsEnvelope = serde_json::from_value(json!({"rows": [{"_id": "a"}, {"_id": "b"}]}))?;
    assert_eq!(wrapped.into_rows().len(), 2);
    let other: RowsEnvelope = serde_json::from_value(json!({"data": 5}))?;
    assert!(other.into_rows().is_empty());
    let null: RowsEnvelope = serde_json::from_value(json!(null))?;
    assert!(null.into_rows().is_empty());
    Ok(())
}

#[test]
fn test_metadata_shapes() -> Result<(), Box<dyn Error>> {
    let table = json!({"_id": "0000", "name": "Mentors", "columns": []});
    let wrapped = parse_metadata(json!({"metadata": {"tables": [table.clone()]}}))?;
    let bare = parse_metadata(json!({"tables": [table]}))?;
    assert_eq!(wrapped, bare);
    assert_eq!(bare.table_names(), vec!["Mentors".to_string()]);
    assert!(bare.table("Mentors").is_some());
    assert!(bare.table("mentors").is_none());

    let e = parse_metadata(json!({"something": []})).unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::MalformedResponse);
    let e = parse_metadata(json!([1, 2])).unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::MalformedResponse);
    Ok(())
}

#[test]
fn test_local_filter() -> Result<(), Box<dyn Error>> {
    let schema = TableSchema {
        id: "t".to_string(),
        table_name: "T".to_string(),
        columns: vec![Column {
            key: "k".to_string(),
            name: "Status".to_string(),
            column_type: ColumnType::Text,
            data: None,
        }],
        views: Vec::new(),
    };
    let raw = vec![
        RawRow::new().with("_id", json!("1")).with("k", json!("Active")),
        RawRow::new().with("_id", json!("2")).with("k", json!("Inactive")),
        RawRow::new().with("_id", json!("3")).with("k", json!("Active")),
        RawRow::new().with("_id", json!("4")),
    ];
    let kept = filter_display_rows(map_rows(&raw, &schema), "Status", "Active");
    let ids: Vec<&str> = kept.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    Ok(())
}

#[test]
fn test_update_outcome() {
    assert!(UpdateOutcome::Updated.is_updated());
    assert!(UpdateOutcome::Updated.into_result().is_ok());
    let failed = UpdateOutcome::Failed {
        reason: "boom".to_string(),
    };
    assert!(!failed.is_updated());
    let e = failed.into_result().unwrap_err();
    assert_eq!(e.code, SeaTableErrorCode::UpdateFailed);
    assert_eq!(e.message, "boom");
}
