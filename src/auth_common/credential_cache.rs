//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::cache_store::CacheStore;
use crate::error::SeaTableError;
use crate::types::Metadata;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) const ACCESS_TOKEN_KEY: &str = "seatable_access_token";
pub(crate) const DTABLE_UUID_KEY: &str = "seatable_dtable_uuid";
pub(crate) const DTABLE_SERVER_KEY: &str = "seatable_dtable_server";
pub(crate) const TOKEN_EXPIRY_KEY: &str = "seatable_token_expiry";
pub(crate) const METADATA_KEY: &str = "seatable_metadata";

// Everything the cache owns. Always cleared together.
const ALL_KEYS: [&str; 5] = [
    ACCESS_TOKEN_KEY,
    DTABLE_UUID_KEY,
    DTABLE_SERVER_KEY,
    TOKEN_EXPIRY_KEY,
    METADATA_KEY,
];

/// Descriptive fields of the base, as reported by the token exchange.
///
/// These are not persisted, so a credential loaded from the cache store has
/// none of them until the next exchange.
#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct BaseDetails {
    pub(crate) base_name: Option<String>,
    pub(crate) app_name: Option<String>,
    pub(crate) workspace_id: Option<i64>,
    pub(crate) socket_url: Option<String>,
    pub(crate) db_url: Option<String>,
}

/// A short-lived access credential for one base.
#[derive(Clone, PartialEq)]
pub(crate) struct AccessCredential {
    pub(crate) token: String,
    pub(crate) base_id: String,
    pub(crate) server_url: String,
    pub(crate) expiry: DateTime<Utc>,
    pub(crate) details: BaseDetails,
}

impl AccessCredential {
    pub(crate) fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry > now
    }
}

impl std::fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCredential")
            .field("token", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("server_url", &self.server_url)
            .field("expiry", &self.expiry)
            .field("details", &self.details)
            .finish()
    }
}

/// Persists the current credential and a debug copy of the metadata.
#[derive(Debug, Clone)]
pub(crate) struct CredentialCache {
    store: Arc<dyn CacheStore>,
}

impl CredentialCache {
    pub(crate) fn new(store: Arc<dyn CacheStore>) -> CredentialCache {
        CredentialCache { store }
    }

    /// Load a credential that is still valid at `now`.
    ///
    /// If any field is missing, unparseable or expired, everything is cleared.
    pub(crate) fn load(&self, now: DateTime<Utc>) -> Option<AccessCredential> {
        let token = self.store.get(ACCESS_TOKEN_KEY);
        let base_id = self.store.get(DTABLE_UUID_KEY);
        let server_url = self.store.get(DTABLE_SERVER_KEY);
        let expiry = self.store.get(TOKEN_EXPIRY_KEY);
        let (token, base_id, server_url, expiry) = match (token, base_id, server_url, expiry) {
            (Some(t), Some(b), Some(s), Some(e)) => (t, b, s, e),
            (None, None, None, None) => return None,
            _ => {
                debug!("incomplete cached credential, clearing");
                self.clear_quietly();
                return None;
            }
        };
        let expiry = match DateTime::parse_from_rfc3339(&expiry) {
            Ok(e) => e.with_timezone(&Utc),
            Err(e) => {
                warn!("cached token expiry '{}' is invalid: {}", expiry, e);
                self.clear_quietly();
                return None;
            }
        };
        let cred = AccessCredential {
            token,
            base_id,
            server_url,
            expiry,
            details: BaseDetails::default(),
        };
        if !cred.is_valid_at(now) {
            debug!("cached credential expired at {}, clearing", cred.expiry);
            self.clear_quietly();
            return None;
        }
        debug!(
            "using cached credential for base {}, expires {}",
            cred.base_id, cred.expiry
        );
        Some(cred)
    }

    pub(crate) fn save(&self, cred: &AccessCredential) -> Result<(), SeaTableError> {
        let expiry = cred.expiry.to_rfc3339();
        self.store.set_many(&[
            (ACCESS_TOKEN_KEY, cred.token.as_str()),
            (DTABLE_UUID_KEY, cred.base_id.as_str()),
            (DTABLE_SERVER_KEY, cred.server_url.as_str()),
            (TOKEN_EXPIRY_KEY, expiry.as_str()),
        ])
    }

    /// Store a copy of the metadata for inspection. It is never read back.
    pub(crate) fn save_metadata(&self, metadata: &Metadata) -> Result<(), SeaTableError> {
        let data = serde_json::to_string(metadata)?;
        self.store.set(METADATA_KEY, &data)
    }

    pub(crate) fn clear(&self) -> Result<(), SeaTableError> {
        self.store.remove_many(&ALL_KEYS)
    }

    pub(crate) fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            warn!("error clearing credential cache: {}", e);
        }
    }
}
