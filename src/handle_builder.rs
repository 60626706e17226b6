//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating a [`SeaTable Handle`](crate::Handle)
//!

use std::env;
use std::fmt;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::auth_common::config_file::{
    ConfigFileSettings, DEFAULT_CONFIG_FILE_PATH, DEFAULT_PROFILE,
};
use crate::cache_store::{CacheStore, FileCacheStore, MemoryCacheStore};
use crate::error::{ia_err, SeaTableError};
use crate::handle::Handle;
use reqwest::Client;

pub(crate) const DEFAULT_ENDPOINT: &str = "https://cloud.seatable.io";

/// Builder used to set all the parameters to create a [`SeaTable Handle`](crate::Handle).
///
/// At minimum an API token must be given, either directly with
/// [`api_token()`](HandleBuilder::api_token()), from a config file, or from the environment.
#[derive(Default, Clone)]
pub struct HandleBuilder {
    pub(crate) api_token: String,
    pub(crate) endpoint: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) client: Option<Client>,
    pub(crate) cache_store: Option<Arc<dyn CacheStore>>,
    // For error messaging
    pub(crate) from_environment: bool,
}

impl fmt::Debug for HandleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleBuilder")
            .field("api_token", &if self.api_token.is_empty() { "" } else { "<redacted>" })
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("cache_store", &self.cache_store)
            .finish()
    }
}

impl HandleBuilder {
    /// Create a new HandleBuilder struct.
    ///
    /// The default HandleBuilder has no API token. Consider calling
    /// [`from_environment()`](HandleBuilder::from_environment()) to collect all parameters from
    /// the local environment by default.
    pub fn new() -> Self {
        HandleBuilder {
            ..Default::default()
        }
    }
    /// Build a new [`Handle`].
    ///
    /// If the cache store holds a credential that has not expired, the handle
    /// starts out using it; otherwise the first operation exchanges the API token.
    pub async fn build(self) -> Result<Handle, SeaTableError> {
        Handle::new(&self).await
    }
    /// Gather configuration settings from the current envrionment.
    ///
    /// Values can be overridden in code if this method is called first and other
    /// methods are called afterwards.
    ///
    /// The following environment variables are used:
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `SEATABLE_CONFIG_FILE` | Path of a config file to read first (see [`HandleBuilder::from_config_file()`]). |
    /// | `SEATABLE_PROFILE` | Profile to use from the config file. Defaults to `DEFAULT`. |
    /// | `SEATABLE_API_TOKEN` | The base API token. See [`HandleBuilder::api_token()`]. |
    /// | `SEATABLE_ENDPOINT` | The service URL. See [`HandleBuilder::endpoint()`]. |
    /// | `SEATABLE_CACHE_FILE` | Path of a JSON file used to cache credentials. See [`HandleBuilder::cache_file()`]. |
    ///
    pub fn from_environment(mut self) -> Result<Self, SeaTableError> {
        self.from_environment = true;
        if let Ok(file) = env::var("SEATABLE_CONFIG_FILE") {
            let profile = env::var("SEATABLE_PROFILE").unwrap_or(DEFAULT_PROFILE.to_string());
            self = self.from_config_file_with_profile(&file, &profile)?;
        }
        if let Ok(val) = env::var("SEATABLE_API_TOKEN") {
            self = self.api_token(&val)?;
        }
        if let Ok(val) = env::var("SEATABLE_ENDPOINT") {
            self = self.endpoint(&val)?;
        }
        if let Ok(val) = env::var("SEATABLE_CACHE_FILE") {
            self = self.cache_file(&val)?;
        }
        Ok(self)
    }
    /// Read settings from the `DEFAULT` profile of a SeaTable config file.
    ///
    /// Use `~/.seatable/config` unless there is a reason to keep the file elsewhere.
    /// The format is that of a properties file:
    ///
    /// ```ini
    /// [DEFAULT]
    /// api_token=<your-api-token>
    /// endpoint=<optional-service-url>
    /// cache_file=<optional-path-to-cache-file>
    /// timeout_secs=<optional-timeout>
    /// ```
    pub fn from_config_file(self, config_file: &str) -> Result<Self, SeaTableError> {
        self.from_config_file_with_profile(config_file, DEFAULT_PROFILE)
    }
    /// Read settings from the given profile of a SeaTable config file.
    pub fn from_config_file_with_profile(
        mut self,
        config_file: &str,
        profile: &str,
    ) -> Result<Self, SeaTableError> {
        let settings = ConfigFileSettings::new_from_file(config_file, profile)?;
        self = self.api_token(&settings.api_token)?;
        if let Some(ep) = &settings.endpoint {
            self = self.endpoint(ep)?;
        }
        if let Some(cf) = &settings.cache_file {
            self = self.cache_file(cf)?;
        }
        if let Some(t) = settings.timeout {
            self = self.timeout(t)?;
        }
        Ok(self)
    }
    /// Read settings from `~/.seatable/config`.
    pub fn from_default_config_file(self) -> Result<Self, SeaTableError> {
        self.from_config_file(DEFAULT_CONFIG_FILE_PATH)
    }
    /// Set the long-lived API token of the base.
    ///
    /// The token is only ever sent to the access token endpoint; all other calls
    /// use the short-lived access token it is exchanged for.
    pub fn api_token(mut self, api_token: &str) -> Result<Self, SeaTableError> {
        let t = api_token.trim();
        if t.is_empty() {
            return ia_err!("API token must not be empty");
        }
        self.api_token = t.to_string();
        Ok(self)
    }
    /// Set the service URL to use.
    ///
    /// Defaults to `https://cloud.seatable.io`. Use this for self-hosted servers.
    /// A trailing slash is removed.
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self, SeaTableError> {
        let url = url::Url::parse(endpoint)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return ia_err!("endpoint '{}' must use http or https", endpoint);
        }
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }
    /// Specify a [`reqwest::Client`] to use for all http/s connections.
    ///
    /// By default, the [`Handle`](crate::Handle) creates an internal [`reqwest::Client`].
    /// If your application already has a reqwest Client, you can pass that
    /// into the HandleBuilder to avoid creating multiple connection pools.
    pub fn reqwest_client(mut self, client: &Client) -> Result<Self, SeaTableError> {
        self.client = Some(client.clone());
        Ok(self)
    }
    /// Specify the timeout used for operations.
    ///
    /// Currently this is used for both connection and request timeouts.
    /// The access token exchange never waits longer than 10 seconds.
    ///
    /// The default timeout is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, SeaTableError> {
        if timeout.is_zero() {
            return ia_err!("timeout must be greater than zero");
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
    /// Specify the store used to persist credentials between sessions.
    ///
    /// The default is a [`MemoryCacheStore`], which forgets everything when the
    /// process exits.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Result<Self, SeaTableError> {
        self.cache_store = Some(store);
        Ok(self)
    }
    /// Persist credentials in a JSON file at `path` (see [`FileCacheStore`]).
    pub fn cache_file(self, path: &str) -> Result<Self, SeaTableError> {
        let store = FileCacheStore::new(path)?;
        self.cache_store(Arc::new(store))
    }

    pub(crate) fn resolved_endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            &self.endpoint
        }
    }

    pub(crate) fn resolved_cache_store(&self) -> Arc<dyn CacheStore> {
        match &self.cache_store {
            Some(s) => s.clone(),
            None => Arc::new(MemoryCacheStore::new()),
        }
    }
}
