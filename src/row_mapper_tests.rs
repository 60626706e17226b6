//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::row_mapper::{display_value_equals, map_row, map_value};
use crate::types::{Column, ColumnData, ColumnType, RawRow, SelectOption, TableSchema};
use serde_json::{json, Value};
use std::error::Error;
use std::result::Result;

fn column(key: &str, name: &str, column_type: ColumnType, options: &[(&str, &str)]) -> Column {
    Column {
        key: key.to_string(),
        name: name.to_string(),
        column_type,
        data: if options.is_empty() {
            None
        } else {
            Some(ColumnData {
                options: options.iter().map(|(i, n)| SelectOption::new(i, n)).collect(),
            })
        },
    }
}

fn colors() -> Column {
    column(
        "c1",
        "Color",
        ColumnType::MultipleSelect,
        &[("o1", "Red"), ("o2", "Blue")],
    )
}

fn schema() -> TableSchema {
    TableSchema {
        id: "0000".to_string(),
        table_name: "Mentors".to_string(),
        columns: vec![
            column("k0", "Name", ColumnType::Text, &[]),
            column("k1", "Status", ColumnType::SingleSelect, &[("o1", "Active"), ("o2", "Paused")]),
            colors(),
            column("k3", "Coach", ColumnType::Collaborator, &[]),
            column("k4", "Sessions", ColumnType::Number, &[]),
        ],
        views: Vec::new(),
    }
}

#[test]
fn test_single_select() -> Result<(), Box<dyn Error>> {
    let c = column("k", "Color", ColumnType::SingleSelect, &[("o1", "Red")]);
    assert_eq!(map_value(&json!("o1"), &c), json!("Red"));
    // unknown ids pass through unchanged
    assert_eq!(map_value(&json!("o9"), &c), json!("o9"));
    assert_eq!(map_value(&Value::Null, &c), Value::Null);
    Ok(())
}

#[test]
fn test_multiple_select_shapes() -> Result<(), Box<dyn Error>> {
    let c = colors();
    assert_eq!(map_value(&json!(["o1", "o2"]), &c), json!(["Red", "Blue"]));
    assert_eq!(map_value(&json!("o1,o2"), &c), json!(["Red", "Blue"]));
    assert_eq!(map_value(&json!("o1, o2"), &c), json!(["Red", "Blue"]));
    assert_eq!(map_value(&json!("o1"), &c), json!(["Red"]));
    assert_eq!(map_value(&json!(["o1", "o7"]), &c), json!(["Red", "o7"]));
    // nothing selected
    assert_eq!(map_value(&json!(""), &c), json!([]));
    assert_eq!(map_value(&json!([]), &c), json!([]));
    Ok(())
}

#[test]
fn test_collaborators() -> Result<(), Box<dyn Error>> {
    let c = column("k", "Coach", ColumnType::Collaborator, &[]);
    let raw = json!([
        "plain@example.com",
        {"name": "Ada", "email": "ada@example.com"},
        {"email": "bob@example.com"},
        {"id": 7}
    ]);
    assert_eq!(
        map_value(&raw, &c),
        json!(["plain@example.com", "Ada", "bob@example.com", {"id": 7}])
    );
    Ok(())
}

#[test]
fn test_map_row() -> Result<(), Box<dyn Error>> {
    let raw = RawRow::new()
        .with("_id", json!("row-1"))
        .with("_ctime", json!("2024-05-01T10:00:00Z"))
        .with("_archived", json!(false))
        .with("k0", json!("Jane"))
        .with("k1", json!("o1"))
        .with("c1", json!("o2"))
        .with("k3", json!([{"name": "Ada"}]))
        .with("unrelated", json!("dropped"));
    let row = map_row(&raw, &schema());

    assert_eq!(row.id(), Some("row-1"));
    assert_eq!(row.get_str("Name"), Some("Jane"));
    assert_eq!(row.get_str("Status"), Some("Active"));
    assert_eq!(row.get("Color"), Some(&json!(["Blue"])));
    assert_eq!(row.get("Coach"), Some(&json!(["Ada"])));
    assert_eq!(row.get("_ctime"), Some(&json!("2024-05-01T10:00:00Z")));
    assert_eq!(row.get("_archived"), Some(&json!(false)));
    // absent columns are omitted, not null-filled
    assert!(!row.contains_key("Sessions"));
    // no internal key leaks through
    for key in ["k0", "k1", "c1", "k3", "unrelated"] {
        assert!(!row.contains_key(key), "{} leaked into display row", key);
    }
    assert_eq!(row.len(), 7);
    Ok(())
}

#[test]
fn test_map_row_is_deterministic() -> Result<(), Box<dyn Error>> {
    let raw = RawRow::new()
        .with("_id", json!("r"))
        .with("k1", json!("o2"))
        .with("k4", json!(3));
    let s = schema();
    let a = map_row(&raw, &s);
    let b = map_row(&raw, &s);
    assert_eq!(a, b);
    assert_eq!(a.get("Sessions"), Some(&json!(3)));
    Ok(())
}

#[test]
fn test_schema_from_json() -> Result<(), Box<dyn Error>> {
    let t: TableSchema = serde_json::from_value(json!({
        "_id": "0000",
        "name": "Mentors",
        "columns": [
            {"key": "k1", "name": "Status", "type": "single-select",
             "data": {"options": [{"id": "o1", "name": "Active", "color": "#fff"}, {"name": "no id"}]}},
            {"key": "k2", "name": "Photo", "type": "image", "data": null},
            {"key": "k3", "name": "Tags", "type": "multiple-select", "data": {"options": null}}
        ]
    }))?;
    let status = t.column_by_name("Status").ok_or("missing Status")?;
    assert_eq!(status.column_type, ColumnType::SingleSelect);
    assert_eq!(status.options().len(), 1);
    assert_eq!(status.option_name("o1"), Some("Active"));
    assert_eq!(t.column_by_key("k2").ok_or("missing k2")?.column_type, ColumnType::Other);
    assert!(t.column_by_name("Tags").ok_or("missing Tags")?.options().is_empty());
    assert_eq!(t.column_names(), vec!["Status", "Photo", "Tags"]);
    Ok(())
}

#[test]
fn test_display_value_equals() {
    assert!(display_value_equals(Some(&json!("Active")), "Active"));
    assert!(!display_value_equals(Some(&json!("active")), "Active"));
    assert!(!display_value_equals(Some(&json!("Active ")), "Active"));
    assert!(!display_value_equals(Some(&json!(5)), "5"));
    assert!(!display_value_equals(Some(&json!(["Active"])), "Active"));
    assert!(!display_value_equals(None, "Active"));
}
