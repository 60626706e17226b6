//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{malformed_err, SeaTableError};
use crate::handle::{ApiRequest, Handle};
use crate::types::{Metadata, TableSchema};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// In-memory schema of the base, shared by every clone of a [`Handle`].
#[derive(Debug, Default)]
pub(crate) struct MetadataCache {
    current: Mutex<Option<Arc<Metadata>>>,
}

impl MetadataCache {
    pub(crate) fn get(&self) -> Option<Arc<Metadata>> {
        match self.current.lock() {
            Ok(g) => g.clone(),
            Err(_) => None,
        }
    }

    pub(crate) fn set(&self, metadata: Arc<Metadata>) {
        if let Ok(mut g) = self.current.lock() {
            *g = Some(metadata);
        }
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut g) = self.current.lock() {
            *g = None;
        }
    }
}

// The metadata endpoint answers either `{"metadata":{"tables":[...]}}` or a
// bare `{"tables":[...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetadataEnvelope {
    Wrapped { metadata: Metadata },
    Bare { tables: Vec<TableSchema> },
}

impl MetadataEnvelope {
    fn into_metadata(self) -> Metadata {
        match self {
            MetadataEnvelope::Wrapped { metadata } => metadata,
            MetadataEnvelope::Bare { tables } => Metadata { tables },
        }
    }
}

pub(crate) fn parse_metadata(body: Value) -> Result<Metadata, SeaTableError> {
    match serde_json::from_value::<MetadataEnvelope>(body) {
        Ok(env) => Ok(env.into_metadata()),
        Err(e) => malformed_err!("unexpected metadata response shape: {}", e),
    }
}

impl Handle {
    /// Get the schema of the base.
    ///
    /// The schema is fetched once and then served from memory until
    /// `force_refresh` is set or the cached state is invalidated. A copy is
    /// written to the cache store for inspection; it is never read back.
    pub async fn get_metadata(&self, force_refresh: bool) -> Result<Arc<Metadata>, SeaTableError> {
        if !force_refresh {
            if let Some(m) = self.inner.metadata.get() {
                return Ok(m);
            }
        }
        let req = ApiRequest {
            method: Method::GET,
            resource: "metadata",
            query: Vec::new(),
            body: None,
            timeout: self.get_timeout(&None),
        };
        let body = self.send_api_request(&req).await?;
        let metadata = Arc::new(parse_metadata(body)?);
        debug!("fetched metadata: {} tables", metadata.tables.len());
        if let Err(e) = self.inner.auth.cache().save_metadata(&metadata) {
            warn!("could not persist metadata copy: {}", e);
        }
        self.inner.metadata.set(metadata.clone());
        Ok(metadata)
    }

    /// Look up a table in the cached schema by exact name.
    ///
    /// Returns `None` if the table is unknown or no schema has been fetched yet.
    /// This never makes a remote call; see [`get_table_structure()`](Handle::get_table_structure()).
    pub fn table_structure(&self, table_name: &str) -> Option<TableSchema> {
        self.inner
            .metadata
            .get()
            .and_then(|m| m.table(table_name).cloned())
    }

    /// Look up a table by exact name, fetching the schema first if none is cached.
    pub async fn get_table_structure(&self, table_name: &str) -> Result<Option<TableSchema>, SeaTableError> {
        let metadata = self.get_metadata(false).await?;
        Ok(metadata.table(table_name).cloned())
    }

    /// Names of all tables in the base.
    pub async fn list_tables(&self) -> Result<Vec<String>, SeaTableError> {
        Ok(self.get_metadata(false).await?.table_names())
    }

    // Schema of `table_name`, or TableNotFound.
    pub(crate) async fn require_table(&self, table_name: &str) -> Result<TableSchema, SeaTableError> {
        match self.get_table_structure(table_name).await? {
            Some(t) => Ok(t),
            None => Err(SeaTableError::new(
                crate::error::SeaTableErrorCode::TableNotFound,
                &format!("table '{}' not found in base metadata", table_name),
            )),
        }
    }
}
