//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, SeaTableError, SeaTableErrorCode};
use crate::handle::{ApiRequest, Handle};
use crate::query_request::QueryRowsRequest;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::result::Result;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Outcome of an [`UpdateRowRequest`] that located its target row.
///
/// A rejected or failed update is reported here, not as an error, so callers
/// can log it and carry on. Only failing to find the row is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated,
    Failed { reason: String },
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }

    /// Convert a failed outcome into an [`UpdateFailed`](SeaTableErrorCode::UpdateFailed) error,
    /// for callers that prefer `?`.
    pub fn into_result(self) -> Result<(), SeaTableError> {
        match self {
            UpdateOutcome::Updated => Ok(()),
            UpdateOutcome::Failed { reason } => Err(SeaTableError {
                code: SeaTableErrorCode::UpdateFailed,
                message: reason,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
enum RowTarget {
    #[default]
    None,
    // business id column (display name) and value
    Matching { column: String, value: String },
    RowId(String),
}

/// Struct used for updating some fields of a single row.
///
/// The row is either located by an equality match on one column (see
/// [`matching()`](UpdateRowRequest::matching())), or addressed directly by its
/// internal row id (see [`row_id()`](UpdateRowRequest::row_id())). Only the
/// fields present in the patch are changed; the patch is keyed by column
/// display name and sent as given.
///
/// There is no locking between locating the row and updating it; a concurrent
/// change by another writer is overwritten.
///
/// Example:
/// ```no_run
/// use seatable_rust_sdk::UpdateRowRequest;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = seatable_rust_sdk::Handle::builder().from_environment()?.build().await?;
/// let outcome = UpdateRowRequest::new("Mentors")
///     .matching("Mentor_ID", "M-1042")
///     .field("Phone", "+49 30 1234567")
///     .execute(&handle)
///     .await?;
/// if !outcome.is_updated() {
///     eprintln!("update failed: {:?}", outcome);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct UpdateRowRequest {
    pub(crate) table_name: String,
    target: RowTarget,
    pub(crate) patch: Map<String, Value>,
    pub(crate) timeout: Option<Duration>,
}

impl UpdateRowRequest {
    /// Create a new UpdateRowRequest for the given table.
    pub fn new(table_name: &str) -> UpdateRowRequest {
        UpdateRowRequest {
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }

    /// Update the row whose `column_name` column equals `value`.
    ///
    /// If several rows match, the first one is updated.
    pub fn matching(mut self, column_name: &str, value: &str) -> UpdateRowRequest {
        self.target = RowTarget::Matching {
            column: column_name.to_string(),
            value: value.to_string(),
        };
        self
    }

    /// Update the row with this internal row id (`_id`), without looking it up.
    pub fn row_id(mut self, row_id: &str) -> UpdateRowRequest {
        self.target = RowTarget::RowId(row_id.to_string());
        self
    }

    /// Set the fields to change, replacing any set before.
    pub fn patch(mut self, patch: Map<String, Value>) -> UpdateRowRequest {
        self.patch = patch;
        self
    }

    /// Add one field to change.
    pub fn field<T: Into<Value>>(mut self, name: &str, value: T) -> UpdateRowRequest {
        self.patch.insert(name.to_string(), value.into());
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

    /// Locate the row and apply the patch.
    ///
    /// Returns an error with code [`NotFound`](SeaTableErrorCode::NotFound) if no
    /// row matched (no update is sent), or any error from locating the row.
    /// Once the row is located, the result of the update itself is always
    /// returned as an [`UpdateOutcome`].
    #[instrument(skip(self, h), fields(table = %self.table_name))]
    pub async fn execute(&self, h: &Handle) -> Result<UpdateOutcome, SeaTableError> {
        if self.table_name.is_empty() {
            return ia_err!("table name must not be empty");
        }
        let row_id = match &self.target {
            RowTarget::None => {
                return ia_err!("update requires matching() or row_id() to select a row");
            }
            RowTarget::RowId(id) => id.clone(),
            RowTarget::Matching { column, value } => {
                let found = QueryRowsRequest {
                    table_name: self.table_name.clone(),
                    column_name: column.clone(),
                    value: value.clone(),
                    timeout: self.timeout,
                }
                .first(h)
                .await?;
                match found.as_ref().and_then(|r| r.id()) {
                    Some(id) => id.to_string(),
                    None => {
                        return Err(SeaTableError::new(
                            SeaTableErrorCode::NotFound,
                            &format!(
                                "no row with {} '{}' found in table '{}'",
                                column, value, self.table_name
                            ),
                        ));
                    }
                }
            }
        };
        debug!("updating row {}", row_id);
        Ok(self.send_update(h, &row_id).await)
    }

    async fn send_update(&self, h: &Handle, row_id: &str) -> UpdateOutcome {
        let body = json!({
            "table_name": self.table_name,
            "row_id": row_id,
            "row": self.patch,
        });
        let req = ApiRequest {
            method: Method::PUT,
            resource: "rows",
            query: Vec::new(),
            body: Some(&body),
            timeout: h.get_timeout(&self.timeout),
        };
        // judged by status alone; the body is not inspected
        match h.send_api_request_text(&req).await {
            Ok(_) => UpdateOutcome::Updated,
            Err(e) => {
                warn!("update of row {} failed: {}", row_id, e);
                UpdateOutcome::Failed { reason: e.message }
            }
        }
    }
}
