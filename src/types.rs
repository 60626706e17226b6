//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Types describing SeaTable base metadata and rows.
//!
//! Metadata ([`Metadata`], [`TableSchema`], [`Column`], [`SelectOption`]) is
//! fetched once per session and cached by the [`Handle`](crate::Handle).
//! Rows come in two shapes: [`RawRow`], keyed by internal column keys exactly as
//! the service returns them, and [`DisplayRow`], keyed by column display names
//! with select options and collaborators resolved to readable values.
use serde::de::Deserializer;
use serde::Deserialize as _;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full schema of a base: every table with its ordered columns.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

impl Metadata {
    /// Find a table by its exact name.
    pub fn table(&self, table_name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.table_name == table_name)
    }

    /// Names of all tables, in metadata order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.table_name.clone()).collect()
    }
}

/// Schema of a single table.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "name")]
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub views: Vec<ViewInfo>,
}

impl TableSchema {
    /// Look up a column by its display name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by its internal key.
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A view defined on a table. Only the name is of interest to this client.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewInfo {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A single column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ColumnData>,
}

impl Column {
    /// The select options of this column. Empty for non-select columns.
    pub fn options(&self) -> &[SelectOption] {
        match &self.data {
            Some(d) => &d.options,
            None => &[],
        }
    }

    /// Resolve a select option id to its display name.
    pub fn option_name(&self, option_id: &str) -> Option<&str> {
        self.options()
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.name.as_str())
    }
}

/// Type-specific column data. Only select options are modelled.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    #[serde(default, deserialize_with = "lenient_options")]
    pub options: Vec<SelectOption>,
}

/// One selectable option of a single- or multiple-select column.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

impl SelectOption {
    pub fn new(id: &str, name: &str) -> SelectOption {
        SelectOption {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

// The service is not consistent about `data.options`: it may be missing, null,
// or hold entries without an id. Keep whatever entries are well-formed.
fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<SelectOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let mut options = Vec::new();
    if let Value::Array(entries) = v {
        for e in entries {
            if let Ok(o) = serde_json::from_value::<SelectOption>(e) {
                options.push(o);
            }
        }
    }
    Ok(options)
}

/// Column types known to this client.
///
/// Types that need no value resolution are grouped under [`ColumnType::Other`]
/// unless listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    LongText,
    Number,
    SingleSelect,
    MultipleSelect,
    Collaborator,
    Checkbox,
    Date,
    Email,
    Url,
    Link,
    AutoNumber,
    #[serde(other)]
    Other,
}

/// Names of the system fields copied unchanged from raw rows to display rows.
pub const SYSTEM_FIELDS: [&str; 8] = [
    "_id",
    "_ctime",
    "_mtime",
    "_creator",
    "_last_modifier",
    "_locked",
    "_locked_by",
    "_archived",
];

/// A row as returned by the service, keyed by internal column keys.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub Map<String, Value>);

impl RawRow {
    pub fn new() -> RawRow {
        RawRow(Map::new())
    }

    /// The opaque internal row id (`_id`), if present.
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(|v| v.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Builder-style insert, mostly useful for tests.
    pub fn with(mut self, key: &str, value: Value) -> RawRow {
        self.0.insert(key.to_string(), value);
        self
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(m: Map<String, Value>) -> Self {
        RawRow(m)
    }
}

/// A row keyed by column display names, plus the [`SYSTEM_FIELDS`].
///
/// Every other key corresponds to exactly one column display name of the
/// table schema the row was mapped with. Display rows are only produced by
/// [`map_row`](crate::row_mapper::map_row).
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayRow {
    pub(crate) fields: Map<String, Value>,
}

impl DisplayRow {
    /// The opaque internal row id (`_id`), if present.
    pub fn id(&self) -> Option<&str> {
        self.fields.get("_id").and_then(|v| v.as_str())
    }

    /// Get a value by column display name or system field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a value as a string slice, if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}
