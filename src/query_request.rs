//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, SeaTableError, SeaTableErrorCode};
use crate::handle::{ApiRequest, Handle};
use crate::row_mapper::{display_value_equals, map_rows};
use crate::rows_request::ListRowsRequest;
use crate::types::{DisplayRow, RawRow, TableSchema};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::{json, Value};
use std::result::Result;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Struct used for fetching the rows of a table where one column equals a value.
///
/// The column is named by its display name and the value is compared with the
/// column's display value (for select columns that is the option name, not its
/// id). Matching is exact string equality.
///
/// The query is first run on the server. If that fails for any reason, every
/// row of the table is fetched and filtered locally instead, which gives the
/// same result. If the fallback fails too, an empty list is returned: an empty
/// result means "not found or unavailable".
///
/// Example:
/// ```no_run
/// use seatable_rust_sdk::QueryRowsRequest;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = seatable_rust_sdk::Handle::builder().from_environment()?.build().await?;
/// let active = QueryRowsRequest::new("Mentors", "Status", "Active")
///     .execute(&handle)
///     .await?;
/// println!("{} active mentors", active.len());
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct QueryRowsRequest {
    pub(crate) table_name: String,
    pub(crate) column_name: String,
    pub(crate) value: String,
    pub(crate) timeout: Option<Duration>,
}

// Body of a successful `sql` call. Failures may still come back with a
// success status, flagged by `success: false` or an `error_message`.
#[derive(Debug, Default, Deserialize)]
struct SqlResponse {
    #[serde(default)]
    results: Option<Vec<RawRow>>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error_message: Option<String>,
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build the single-predicate equality query for `table`.
pub(crate) fn build_sql(table_name: &str, column_key: &str, value: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = {}",
        quote_identifier(table_name),
        quote_identifier(column_key),
        quote_literal(value)
    )
}

pub(crate) fn parse_sql_response(body: Value) -> Result<Vec<RawRow>, SeaTableError> {
    let resp: SqlResponse = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => {
            return Err(SeaTableError::new(
                SeaTableErrorCode::QueryFailed,
                &format!("unexpected sql response: {}", e),
            ))
        }
    };
    if resp.success == Some(false) || resp.error_message.as_deref().is_some_and(|m| !m.is_empty()) {
        return Err(SeaTableError::new(
            SeaTableErrorCode::QueryFailed,
            &format!(
                "sql query failed: {}",
                resp.error_message.unwrap_or_else(|| "no detail".to_string())
            ),
        ));
    }
    Ok(resp.results.unwrap_or_default())
}

/// Keep the display rows whose `column_name` value equals `value`.
pub(crate) fn filter_display_rows(rows: Vec<DisplayRow>, column_name: &str, value: &str) -> Vec<DisplayRow> {
    rows.into_iter()
        .filter(|r| display_value_equals(r.get(column_name), value))
        .collect()
}

impl QueryRowsRequest {
    /// Create a new QueryRowsRequest matching rows of `table_name` whose
    /// `column_name` column equals `value`.
    pub fn new(table_name: &str, column_name: &str, value: &str) -> QueryRowsRequest {
        QueryRowsRequest {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
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

    /// Run the query and return every matching row, in service order.
    ///
    /// An unknown table or column is an error
    /// ([`TableNotFound`](SeaTableErrorCode::TableNotFound) /
    /// [`ColumnNotFound`](SeaTableErrorCode::ColumnNotFound)), as is a failure
    /// to get credentials or metadata. A failed query is not.
    #[instrument(skip(self, h), fields(table = %self.table_name, column = %self.column_name))]
    pub async fn execute(&self, h: &Handle) -> Result<Vec<DisplayRow>, SeaTableError> {
        if self.column_name.is_empty() {
            return ia_err!("column name must not be empty");
        }
        let schema = h.require_table(&self.table_name).await?;
        let column_key = match schema.column_by_name(&self.column_name) {
            Some(c) => c.key.clone(),
            None => {
                return Err(SeaTableError::new(
                    SeaTableErrorCode::ColumnNotFound,
                    &format!(
                        "column '{}' not found in table '{}'",
                        self.column_name, self.table_name
                    ),
                ))
            }
        };
        match self.query_on_server(h, &column_key).await {
            Ok(raw) => {
                debug!("sql query returned {} rows", raw.len());
                Ok(map_rows(&raw, &schema))
            }
            Err(e) => {
                warn!("sql query failed, filtering locally: {}", e);
                Ok(self.filter_locally(h, &schema).await)
            }
        }
    }

    /// Run the query and return the first matching row, if any.
    pub async fn first(&self, h: &Handle) -> Result<Option<DisplayRow>, SeaTableError> {
        Ok(self.execute(h).await?.into_iter().next())
    }

    async fn query_on_server(&self, h: &Handle, column_key: &str) -> Result<Vec<RawRow>, SeaTableError> {
        let sql = build_sql(&self.table_name, column_key, &self.value);
        debug!("sql: {}", sql);
        let body = json!({ "sql": sql });
        let req = ApiRequest {
            method: Method::POST,
            resource: "sql",
            query: Vec::new(),
            body: Some(&body),
            timeout: h.get_timeout(&self.timeout),
        };
        parse_sql_response(h.send_api_request(&req).await?)
    }

    async fn filter_locally(&self, h: &Handle, schema: &TableSchema) -> Vec<DisplayRow> {
        let list = ListRowsRequest {
            table_name: self.table_name.clone(),
            view_name: None,
            timeout: self.timeout,
        };
        match list.execute_raw(h).await {
            Ok(raw) => {
                let rows = filter_display_rows(map_rows(&raw, schema), &self.column_name, &self.value);
                debug!("local filtering kept {} of {} rows", rows.len(), raw.len());
                rows
            }
            Err(e) => {
                warn!("fallback row fetch failed, returning no rows: {}", e);
                Vec::new()
            }
        }
    }
}
