//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Translation of raw rows into display rows.
//!
//! Raw rows use internal column keys and store select options as option ids.
//! [`map_row`] rekeys them by column display name and resolves values using
//! the table schema. It is pure: no I/O, no logging, and the same inputs always
//! give the same output.
use crate::types::{Column, ColumnType, DisplayRow, RawRow, TableSchema, SYSTEM_FIELDS};
use serde_json::{Map, Value};

/// Map a raw row to a display row using `schema`.
///
/// Columns whose key is absent from the raw row are omitted from the result.
/// Raw keys that are neither a column key nor a system field are dropped.
pub fn map_row(raw: &RawRow, schema: &TableSchema) -> DisplayRow {
    let mut fields = Map::new();
    for column in &schema.columns {
        if let Some(v) = raw.get(&column.key) {
            fields.insert(column.name.clone(), map_value(v, column));
        }
    }
    for field in SYSTEM_FIELDS {
        if let Some(v) = raw.get(field) {
            fields.insert(field.to_string(), v.clone());
        }
    }
    DisplayRow { fields }
}

/// Map every raw row with the same schema, keeping order.
pub fn map_rows(raw: &[RawRow], schema: &TableSchema) -> Vec<DisplayRow> {
    raw.iter().map(|r| map_row(r, schema)).collect()
}

/// Resolve a single raw value according to its column type.
pub fn map_value(value: &Value, column: &Column) -> Value {
    match column.column_type {
        ColumnType::SingleSelect => map_single_select(value, column),
        ColumnType::MultipleSelect => map_multiple_select(value, column),
        ColumnType::Collaborator => map_collaborators(value),
        _ => value.clone(),
    }
}

fn resolve_option(id: &str, column: &Column) -> Value {
    match column.option_name(id) {
        Some(name) => Value::String(name.to_string()),
        None => Value::String(id.to_string()),
    }
}

fn map_single_select(value: &Value, column: &Column) -> Value {
    match value {
        Value::String(id) => resolve_option(id, column),
        _ => value.clone(),
    }
}

// Multi-select values arrive as an array of ids, a comma separated string of
// ids, or a single id. All three become an array of names.
fn map_multiple_select(value: &Value, column: &Column) -> Value {
    match value {
        Value::Array(ids) => Value::Array(
            ids.iter()
                .map(|id| match id {
                    Value::String(s) => resolve_option(s, column),
                    other => other.clone(),
                })
                .collect(),
        ),
        Value::String(s) if s.trim().is_empty() => Value::Array(Vec::new()),
        Value::String(s) if s.contains(',') => Value::Array(
            s.split(',')
                .map(|id| resolve_option(id.trim(), column))
                .collect(),
        ),
        Value::String(s) => Value::Array(vec![resolve_option(s, column)]),
        _ => value.clone(),
    }
}

// Collaborators are either plain strings (usually emails) or objects. Prefer
// the object's name, then its email.
fn map_collaborators(value: &Value) -> Value {
    match value {
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|e| match e {
                    Value::Object(o) => {
                        if let Some(Value::String(name)) = o.get("name") {
                            return Value::String(name.clone());
                        }
                        if let Some(Value::String(email)) = o.get("email") {
                            return Value::String(email.clone());
                        }
                        e.clone()
                    }
                    _ => e.clone(),
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Compare a display value against a filter value using exact string equality.
///
/// Only string values can match; numbers, arrays and objects never do.
pub(crate) fn display_value_equals(value: Option<&Value>, expected: &str) -> bool {
    matches!(value, Some(Value::String(s)) if s == expected)
}
