//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::credential_cache::{AccessCredential, BaseDetails, CredentialCache};
use crate::error::{malformed_err, user_agent};
use crate::error::{SeaTableError, SeaTableErrorCode};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_derive::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

pub(crate) const ACCESS_TOKEN_PATH: &str = "/api/v2.1/dtable/app-access-token/";

// Lifetime the service gives app access tokens.
const TOKEN_LIFETIME_DAYS: i64 = 3;

/// Body of a successful app-access-token exchange.
///
/// Every field is optional here so that a body missing required fields is
/// reported as a malformed response rather than a json error.
#[derive(Default, Debug, Clone, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub(crate) access_token: Option<String>,
    pub(crate) dtable_uuid: Option<String>,
    pub(crate) dtable_server: Option<String>,
    pub(crate) dtable_socket: Option<String>,
    pub(crate) dtable_db: Option<String>,
    pub(crate) workspace_id: Option<i64>,
    pub(crate) dtable_name: Option<String>,
    pub(crate) app_name: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    error_msg: Option<String>,
    error_message: Option<String>,
}

/// Extract a readable error detail from a service error body.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let eb: ErrorBody = serde_json::from_str(body).ok()?;
    eb.detail.or(eb.error_msg).or(eb.error_message)
}

/// Exchanges the long-lived API token for short-lived access credentials and
/// keeps the current credential valid.
pub(crate) struct AccessTokenProvider {
    api_token: String,
    exchange_url: String,
    exchange_timeout: Duration,
    cache: CredentialCache,
    // Current credential. Never held across awaits, so snapshot reads are synchronous.
    current: std::sync::Mutex<Option<AccessCredential>>,
    // Held across the exchange so that concurrent callers wait for one
    // exchange instead of each starting their own.
    refresh: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for AccessTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenProvider")
            .field("exchange_url", &self.exchange_url)
            .field("current", &self.snapshot())
            .finish()
    }
}

impl AccessTokenProvider {
    /// Create a provider, adopting a still-valid credential from `cache` if there is one.
    pub(crate) fn new(
        api_token: &str,
        endpoint: &str,
        exchange_timeout: Duration,
        cache: CredentialCache,
    ) -> AccessTokenProvider {
        let current = cache.load(Utc::now());
        AccessTokenProvider {
            api_token: api_token.to_string(),
            exchange_url: format!("{}{}", endpoint, ACCESS_TOKEN_PATH),
            exchange_timeout,
            cache,
            current: std::sync::Mutex::new(current),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// A copy of the current credential, valid or not.
    pub(crate) fn snapshot(&self) -> Option<AccessCredential> {
        match self.current.lock() {
            Ok(g) => g.clone(),
            Err(_) => None,
        }
    }

    fn valid_snapshot(&self, now: DateTime<Utc>) -> Option<AccessCredential> {
        self.snapshot().filter(|c| c.is_valid_at(now))
    }

    fn set_current(&self, cred: Option<AccessCredential>) {
        if let Ok(mut g) = self.current.lock() {
            *g = cred;
        }
    }

    /// Return a credential that is valid now, exchanging the API token if needed.
    ///
    /// Validity is checked on every call. Concurrent callers that find the
    /// credential missing or expired share a single exchange.
    pub(crate) async fn ensure_valid(&self, client: &Client) -> Result<AccessCredential, SeaTableError> {
        if let Some(c) = self.valid_snapshot(Utc::now()) {
            return Ok(c);
        }
        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(c) = self.valid_snapshot(Utc::now()) {
            trace!("credential refreshed by a concurrent caller");
            return Ok(c);
        }
        debug!("no valid credential, exchanging API token");
        self.acquire_locked(client).await
    }

    /// Unconditionally exchange the API token for a new credential.
    pub(crate) async fn acquire(&self, client: &Client) -> Result<AccessCredential, SeaTableError> {
        let _guard = self.refresh.lock().await;
        self.acquire_locked(client).await
    }

    /// Drop the current credential (in memory and persisted) if it is still `stale`.
    pub(crate) async fn invalidate_if_current(&self, stale: &AccessCredential) {
        let _guard = self.refresh.lock().await;
        if self.snapshot().as_ref() == Some(stale) {
            debug!("invalidating rejected credential");
            self.set_current(None);
            self.cache.clear_quietly();
        }
    }

    /// Drop the current credential and everything persisted with it.
    pub(crate) async fn invalidate(&self) -> Result<(), SeaTableError> {
        let _guard = self.refresh.lock().await;
        self.set_current(None);
        self.cache.clear()
    }

    // Caller must hold the refresh lock.
    async fn acquire_locked(&self, client: &Client) -> Result<AccessCredential, SeaTableError> {
        let result = self.exchange(client).await.and_then(|resp| {
            let cred = Self::credential_from_response(resp, Utc::now())?;
            self.cache.save(&cred)?;
            Ok(cred)
        });
        match result {
            Ok(cred) => {
                debug!(
                    "acquired credential for base {}, server {}, expires {}",
                    cred.base_id, cred.server_url, cred.expiry
                );
                self.set_current(Some(cred.clone()));
                Ok(cred)
            }
            Err(e) => {
                warn!("error getting access token: {}", e);
                self.set_current(None);
                self.cache.clear_quietly();
                Err(e)
            }
        }
    }

    pub(crate) fn credential_from_response(
        resp: AccessTokenResponse,
        acquired_at: DateTime<Utc>,
    ) -> Result<AccessCredential, SeaTableError> {
        let token = match resp.access_token {
            Some(t) if !t.is_empty() => t,
            _ => return malformed_err!("no access token in token exchange response"),
        };
        let (base_id, server_url) = match (resp.dtable_uuid, resp.dtable_server) {
            (Some(b), Some(s)) if !b.is_empty() && !s.is_empty() => (b, s),
            _ => {
                return malformed_err!(
                    "missing dtable_uuid or dtable_server in token exchange response"
                )
            }
        };
        Ok(AccessCredential {
            token,
            base_id,
            // stored exactly as returned
            server_url,
            expiry: acquired_at + chrono::Duration::days(TOKEN_LIFETIME_DAYS),
            details: BaseDetails {
                base_name: resp.dtable_name,
                app_name: resp.app_name,
                workspace_id: resp.workspace_id,
                socket_url: resp.dtable_socket,
                db_url: resp.dtable_db,
            },
        })
    }

    /// Perform the token exchange without touching any cached state.
    #[instrument(skip(self, client), fields(url = %self.exchange_url))]
    pub(crate) async fn exchange(&self, client: &Client) -> Result<AccessTokenResponse, SeaTableError> {
        if self.api_token.is_empty() {
            return Err(SeaTableError::new(
                SeaTableErrorCode::IllegalArgument,
                "API token is missing",
            ));
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_token))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("User-Agent", HeaderValue::from_str(user_agent())?);

        let resp = client
            .get(&self.exchange_url)
            .headers(headers)
            .timeout(self.exchange_timeout)
            .send()
            .await
            .map_err(classify_exchange_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(classify_exchange_error)?;
        trace!("token exchange returned status {}", status);
        if status.as_u16() == 401 {
            return Err(SeaTableError::new(
                SeaTableErrorCode::Unauthorized,
                "invalid API token - check the configured api_token",
            ));
        }
        if status.as_u16() == 403 {
            return Err(SeaTableError::new(
                SeaTableErrorCode::Forbidden,
                "API token does not have permission to access this base",
            ));
        }
        if !status.is_success() {
            let detail = error_detail(&body).unwrap_or_else(|| format!("http status {}", status));
            return Err(SeaTableError::new(
                SeaTableErrorCode::ExchangeFailed,
                &format!("failed to get access token: {}", detail),
            ));
        }
        match serde_json::from_str::<AccessTokenResponse>(&body) {
            Ok(r) => Ok(r),
            Err(e) => malformed_err!("invalid token exchange response: {}", e),
        }
    }
}

fn classify_exchange_error(e: reqwest::Error) -> SeaTableError {
    let err = SeaTableError::from(e);
    match err.code {
        SeaTableErrorCode::Unreachable => SeaTableError {
            code: SeaTableErrorCode::Unreachable,
            message: format!("cannot connect to SeaTable servers: {}", err.message),
        },
        SeaTableErrorCode::RequestTimeout => err,
        _ => SeaTableError {
            code: SeaTableErrorCode::ExchangeFailed,
            message: format!("failed to get access token: {}", err.message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn response(token: Option<&str>, uuid: Option<&str>, server: Option<&str>) -> AccessTokenResponse {
        AccessTokenResponse {
            access_token: token.map(|s| s.to_string()),
            dtable_uuid: uuid.map(|s| s.to_string()),
            dtable_server: server.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn credential_expires_three_days_after_acquisition() -> Result<(), Box<dyn Error>> {
        let now = Utc::now();
        let c = AccessTokenProvider::credential_from_response(
            response(Some("t"), Some("u"), Some("https://s/dtable-server/")),
            now,
        )?;
        assert_eq!(c.expiry - now, chrono::Duration::days(3));
        assert_eq!(c.server_url, "https://s/dtable-server/");
        Ok(())
    }

    #[test]
    fn base_details_are_kept() -> Result<(), Box<dyn Error>> {
        let body = r#"{
            "app_name": "mentoring",
            "access_token": "t",
            "dtable_uuid": "u",
            "dtable_server": "https://s/dtable-server/",
            "dtable_socket": "https://s/",
            "dtable_db": "https://s/dtable-db/",
            "workspace_id": 42,
            "dtable_name": "Mentoring"
        }"#;
        let resp: AccessTokenResponse = serde_json::from_str(body)?;
        let c = AccessTokenProvider::credential_from_response(resp, Utc::now())?;
        assert_eq!(c.details.base_name.as_deref(), Some("Mentoring"));
        assert_eq!(c.details.app_name.as_deref(), Some("mentoring"));
        assert_eq!(c.details.workspace_id, Some(42));
        assert_eq!(c.details.socket_url.as_deref(), Some("https://s/"));
        assert_eq!(c.details.db_url.as_deref(), Some("https://s/dtable-db/"));

        // optional fields may be absent
        let c = AccessTokenProvider::credential_from_response(
            response(Some("t"), Some("u"), Some("s")),
            Utc::now(),
        )?;
        assert!(c.details.base_name.is_none());
        assert!(c.details.workspace_id.is_none());
        Ok(())
    }

    #[test]
    fn missing_fields_are_malformed() {
        let now = Utc::now();
        for r in [
            response(None, Some("u"), Some("s")),
            response(Some("t"), None, Some("s")),
            response(Some("t"), Some("u"), None),
            response(Some(""), Some("u"), Some("s")),
        ] {
            let e = AccessTokenProvider::credential_from_response(r, now).unwrap_err();
            assert_eq!(e.code, SeaTableErrorCode::MalformedResponse);
        }
    }

    #[test]
    fn error_detail_prefers_detail_field() {
        assert_eq!(
            error_detail("{\"detail\":\"Token expired\"}"),
            Some("Token expired".to_string())
        );
        assert_eq!(
            error_detail("{\"error_msg\":\"bad\"}"),
            Some("bad".to_string())
        );
        assert_eq!(error_detail("not json"), None);
    }
}
