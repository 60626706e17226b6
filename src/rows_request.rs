//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, SeaTableError};
use crate::handle::{ApiRequest, Handle};
use crate::row_mapper::map_rows;
use crate::types::{DisplayRow, RawRow};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::Value;
use std::result::Result;
use std::time::Duration;
use tracing::{debug, warn};

/// Struct used for fetching every row of a table.
///
/// This request returns all rows of the table, optionally restricted to the rows
/// visible in a named view. Use [`execute_raw()`](ListRowsRequest::execute_raw())
/// to get rows keyed by internal column keys, or [`execute()`](ListRowsRequest::execute())
/// to get display rows keyed by column names.
///
/// Example:
/// ```no_run
/// use seatable_rust_sdk::ListRowsRequest;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = seatable_rust_sdk::Handle::builder().from_environment()?.build().await?;
/// let rows = ListRowsRequest::new("Mentors")
///     .view("Active mentors")
///     .execute(&handle)
///     .await?;
/// for row in &rows {
///     println!("{:?}", row.get("Name"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct ListRowsRequest {
    pub(crate) table_name: String,
    pub(crate) view_name: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

// The rows endpoint returns either a bare array or `{"rows":[...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RowsEnvelope {
    Bare(Vec<RawRow>),
    Wrapped { rows: Vec<RawRow> },
    Other(Value),
}

impl RowsEnvelope {
    pub(crate) fn into_rows(self) -> Vec<RawRow> {
        match self {
            RowsEnvelope::Bare(rows) => rows,
            RowsEnvelope::Wrapped { rows } => rows,
            RowsEnvelope::Other(v) => {
                warn!("unexpected rows response shape, treating as empty: {}", shape_of(&v));
                Vec::new()
            }
        }
    }
}

fn shape_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ListRowsRequest {
    /// Create a new ListRowsRequest for the given table.
    pub fn new(table_name: &str) -> ListRowsRequest {
        ListRowsRequest {
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }

    /// Only return the rows visible in the named view.
    pub fn view(mut self, view_name: &str) -> ListRowsRequest {
        self.view_name = Some(view_name.to_string());
        self
    }

    /// Specify the timeout value for the request.
    ///
    /// This is optional.
    /// If set, it must be greater than or equal to 1 millisecond, otherwise an
    /// IllegalArgument error will be returned.
    /// If not set, the default timeout value configured for the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Result<Self, SeaTableError> {
        if t.as_millis() == 0 {
            return ia_err!("timeout must be at least 1 millisecond");
        }
        self.timeout = Some(t.clone());
        Ok(self)
    }

    /// Fetch the rows exactly as the service returns them.
    pub async fn execute_raw(&self, h: &Handle) -> Result<Vec<RawRow>, SeaTableError> {
        if self.table_name.is_empty() {
            return ia_err!("table name must not be empty");
        }
        let mut query = vec![("table_name", self.table_name.as_str())];
        if let Some(v) = &self.view_name {
            query.push(("view_name", v.as_str()));
        }
        let req = ApiRequest {
            method: Method::GET,
            resource: "rows",
            query,
            body: None,
            timeout: h.get_timeout(&self.timeout),
        };
        let body = h.send_api_request(&req).await?;
        let rows = serde_json::from_value::<RowsEnvelope>(body)?.into_rows();
        debug!("fetched {} rows from table '{}'", rows.len(), self.table_name);
        Ok(rows)
    }

    /// Fetch the rows and map them to display rows.
    ///
    /// The table schema is fetched first (or taken from the cache). If the table
    /// is not part of the schema a [`TableNotFound`](crate::SeaTableErrorCode::TableNotFound)
    /// error is returned.
    pub async fn execute(&self, h: &Handle) -> Result<Vec<DisplayRow>, SeaTableError> {
        let schema = h.require_table(&self.table_name).await?;
        let raw = self.execute_raw(h).await?;
        Ok(map_rows(&raw, &schema))
    }
}
