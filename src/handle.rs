//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::access_token_provider::{error_detail, AccessTokenProvider};
use crate::auth_common::credential_cache::{AccessCredential, CredentialCache};
use crate::error::{ia_err, user_agent};
use crate::error::{SeaTableError, SeaTableErrorCode};
use crate::handle_builder::HandleBuilder;
use crate::metadata::MetadataCache;
use crate::rows_request::ListRowsRequest;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;

use chrono::{DateTime, Utc};
use std::result::Result;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

// The token exchange never waits longer than this.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// **The main SeaTable handle**.
///
/// This should be created once and used throughout the application lifetime,
/// across all tasks. It owns the access credential and the metadata cache for
/// one base.
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it uses an
/// [`Arc`] internally, so calling `.clone()` on this struct will always return the
/// same underlying handle.
#[derive(Clone, Debug)]
pub struct Handle {
    // Use an inner Arc so cloning keeps the same contents
    pub(crate) inner: Arc<HandleRef>,
}

#[derive(Debug)]
pub(crate) struct HandleRef {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoint: String,
    pub(crate) auth: AccessTokenProvider,
    pub(crate) metadata: MetadataCache,
    request_id: AtomicUsize,
    timeout: Duration,
}

/// Summary of the handle's credential state, for diagnostics.
///
/// The access token itself is never exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub has_token: bool,
    pub expires: Option<DateTime<Utc>>,
    pub base_uuid: Option<String>,
    pub server_url: Option<String>,
    /// Base name, known only after an exchange in this session.
    pub base_name: Option<String>,
    pub app_name: Option<String>,
    pub workspace_id: Option<i64>,
    pub socket_url: Option<String>,
    pub db_url: Option<String>,
    pub has_cached_metadata: bool,
}

/// Result of [`Handle::debug_connection()`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    pub table_count: Option<usize>,
    pub first_table_rows: Option<usize>,
}

/// One call to the base API gateway.
#[derive(Debug)]
pub(crate) struct ApiRequest<'a> {
    pub(crate) method: Method,
    // last path segment, e.g. "rows"
    pub(crate) resource: &'a str,
    pub(crate) query: Vec<(&'a str, &'a str)>,
    pub(crate) body: Option<&'a Value>,
    pub(crate) timeout: Duration,
}

impl Handle {
    /// Create a new [`HandleBuilder`].
    pub fn builder() -> HandleBuilder {
        HandleBuilder::new()
    }

    // Create the new Handle based on builder configuration
    pub(crate) async fn new(b: &HandleBuilder) -> Result<Handle, SeaTableError> {
        if b.api_token.is_empty() {
            if b.from_environment {
                return ia_err!("cannot build handle: no API token specified. set SEATABLE_API_TOKEN environment.");
            }
            return ia_err!("cannot build handle: no API token specified");
        }
        // default timeout to 30 seconds
        let timeout = b.timeout.unwrap_or(Duration::new(30, 0));
        let c = {
            if let Some(c) = &b.client {
                c.clone()
            } else {
                reqwest::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(timeout)
                    .build()?
            }
        };
        let endpoint = b.resolved_endpoint().to_string();
        let cache = CredentialCache::new(b.resolved_cache_store());
        let auth = AccessTokenProvider::new(
            &b.api_token,
            &endpoint,
            timeout.min(EXCHANGE_TIMEOUT),
            cache,
        );
        debug!("Creating new Handle: endpoint={}, {:?}", endpoint, auth);
        Ok(Handle {
            inner: Arc::new(HandleRef {
                client: c,
                endpoint: endpoint,
                auth: auth,
                metadata: MetadataCache::default(),
                request_id: AtomicUsize::new(1),
                timeout: timeout,
            }),
        })
    }

    /// Make sure a non-expired access token is available.
    ///
    /// If the cached token is missing or expired the API token is exchanged for a
    /// new one. Concurrent callers share one exchange. On failure all cached
    /// state (credential and metadata) is cleared and the error is returned:
    /// [`Unauthorized`](SeaTableErrorCode::Unauthorized),
    /// [`Forbidden`](SeaTableErrorCode::Forbidden),
    /// [`Unreachable`](SeaTableErrorCode::Unreachable),
    /// [`MalformedResponse`](SeaTableErrorCode::MalformedResponse) or
    /// [`ExchangeFailed`](SeaTableErrorCode::ExchangeFailed).
    pub async fn ensure_valid_token(&self) -> Result<(), SeaTableError> {
        self.credential().await.map(|_| ())
    }

    pub(crate) async fn credential(&self) -> Result<AccessCredential, SeaTableError> {
        match self.inner.auth.ensure_valid(&self.inner.client).await {
            Ok(c) => Ok(c),
            Err(e) => {
                self.inner.metadata.clear();
                Err(e)
            }
        }
    }

    /// Forget the access token and cached metadata, in memory and in the cache store.
    ///
    /// The next operation will exchange the API token again.
    pub async fn invalidate(&self) -> Result<(), SeaTableError> {
        self.inner.metadata.clear();
        self.inner.auth.invalidate().await
    }

    /// Describe the current credential state without making any calls.
    pub fn token_info(&self) -> TokenInfo {
        let cred = self.inner.auth.snapshot();
        TokenInfo {
            has_token: cred.is_some(),
            expires: cred.as_ref().map(|c| c.expiry),
            base_uuid: cred.as_ref().map(|c| c.base_id.clone()),
            server_url: cred.as_ref().map(|c| c.server_url.clone()),
            base_name: cred.as_ref().and_then(|c| c.details.base_name.clone()),
            app_name: cred.as_ref().and_then(|c| c.details.app_name.clone()),
            workspace_id: cred.as_ref().and_then(|c| c.details.workspace_id),
            socket_url: cred.as_ref().and_then(|c| c.details.socket_url.clone()),
            db_url: cred.as_ref().and_then(|c| c.details.db_url.clone()),
            has_cached_metadata: self.inner.metadata.get().is_some(),
        }
    }

    /// Check that the API token can be exchanged for an access token.
    ///
    /// This performs an exchange but does not store its result or touch any
    /// cached state.
    pub async fn test_api_token(&self) -> bool {
        match self.inner.auth.exchange(&self.inner.client).await {
            Ok(_) => true,
            Err(e) => {
                warn!("API token test failed: {}", e);
                false
            }
        }
    }

    /// Exercise the whole connection: exchange the API token, fetch fresh
    /// metadata, and fetch the rows of the first table.
    ///
    /// Errors are reported in the returned [`ConnectionReport`], never returned.
    pub async fn debug_connection(&self) -> ConnectionReport {
        let mut report = ConnectionReport::default();
        if let Err(e) = self.inner.auth.acquire(&self.inner.client).await {
            self.inner.metadata.clear();
            report.message = format!("token generation failed: {}", e);
            return report;
        }
        let metadata = match self.get_metadata(true).await {
            Ok(m) => m,
            Err(e) => {
                report.message = format!("metadata fetch failed: {}", e);
                return report;
            }
        };
        report.table_count = Some(metadata.tables.len());
        if let Some(first) = metadata.tables.first() {
            match ListRowsRequest::new(&first.table_name).execute_raw(self).await {
                Ok(rows) => report.first_table_rows = Some(rows.len()),
                Err(e) => {
                    report.message = format!("row fetch failed: {}", e);
                    return report;
                }
            }
        }
        report.success = true;
        report.message = "all tests passed".to_string();
        report
    }

    // Send a request to the base API gateway and return its JSON body.
    pub(crate) async fn send_api_request(&self, req: &ApiRequest<'_>) -> Result<Value, SeaTableError> {
        let text = self.send_api_request_text(req).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    // Send a request to the base API gateway and return its body unparsed.
    // Any success status is Ok, whatever the body holds.
    // A rejected access token is dropped and the request is tried once more
    // with a freshly exchanged one.
    pub(crate) async fn send_api_request_text(&self, req: &ApiRequest<'_>) -> Result<String, SeaTableError> {
        let mut retries = 0;
        loop {
            let cred = self.credential().await?;
            match self.send_api_request_once(&cred, req).await {
                Err(e) if e.code == SeaTableErrorCode::Unauthorized && retries < 1 => {
                    retries += 1;
                    trace!("access token rejected, retrying with a new one");
                    self.inner.metadata.clear();
                    self.inner.auth.invalidate_if_current(&cred).await;
                    continue;
                }
                r => return r,
            }
        }
    }

    #[instrument(level = "debug", skip(self, cred, req), fields(method = %req.method, resource = req.resource))]
    async fn send_api_request_once(
        &self,
        cred: &AccessCredential,
        req: &ApiRequest<'_>,
    ) -> Result<String, SeaTableError> {
        let request_id = self.inner.request_id.fetch_add(1, Ordering::Relaxed);
        let url = format!(
            "{}/api-gateway/api/v2/dtables/{}/{}/",
            self.inner.endpoint, cred.base_id, req.resource
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", cred.token))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("User-Agent", HeaderValue::from_str(user_agent())?);

        trace!("request {}: {} {} {:?}", request_id, req.method, url, req.query);
        let mut rb = self
            .inner
            .client
            .request(req.method.clone(), &url)
            .headers(headers)
            .timeout(req.timeout);
        if !req.query.is_empty() {
            rb = rb.query(&req.query);
        }
        if let Some(body) = req.body {
            rb = rb.json(body);
        }
        let resp = rb.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        trace!("request {}: status {}", request_id, status);

        if !status.is_success() {
            let detail = error_detail(&text).unwrap_or(text);
            let code = match status.as_u16() {
                401 => SeaTableErrorCode::Unauthorized,
                403 => SeaTableErrorCode::Forbidden,
                _ => SeaTableErrorCode::ServerError,
            };
            return Err(SeaTableError::new(
                code,
                &format!("got unexpected http status: {}, response text: {}", status, detail),
            ));
        }
        Ok(text)
    }

    pub(crate) fn get_timeout(&self, t: &Option<Duration>) -> Duration {
        // if t is given, use that. If not, use handle's timeout
        if let Some(d) = t {
            return d.clone();
        }
        self.inner.timeout.clone()
    }
}
