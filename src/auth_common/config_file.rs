//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::file_utils::expand_user_home;
use crate::error::{ia_err, SeaTableError};
use ini::Ini;
use std::time::Duration;

pub(crate) const DEFAULT_CONFIG_FILE_PATH: &str = "~/.seatable/config";
pub(crate) const DEFAULT_PROFILE: &str = "DEFAULT";
const API_TOKEN: &str = "api_token";
const ENDPOINT: &str = "endpoint";
const CACHE_FILE: &str = "cache_file";
const TIMEOUT_SECS: &str = "timeout_secs";

/// Settings read from one profile of a SeaTable config file.
///
/// The file is in INI format:
/// ```ini
/// [DEFAULT]
/// api_token=<your-api-token>
/// endpoint=https://cloud.seatable.io
/// cache_file=~/.seatable/cache.json
/// timeout_secs=30
/// ```
/// Only `api_token` is required.
#[derive(Default, Debug, Clone)]
pub(crate) struct ConfigFileSettings {
    pub(crate) api_token: String,
    pub(crate) endpoint: Option<String>,
    pub(crate) cache_file: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl ConfigFileSettings {
    pub(crate) fn new_from_file(
        config_file_path: &str,
        profile_name: &str,
    ) -> Result<ConfigFileSettings, SeaTableError> {
        tracing::debug!(
            "Reading SeaTable config from file {} and profile {}",
            config_file_path,
            profile_name
        );
        let file_path = expand_user_home(config_file_path)?;
        let config = match Ini::load_from_file(&file_path) {
            Ok(c) => c,
            Err(e) => {
                return ia_err!(
                    "error reading SeaTable config file '{}': {}",
                    file_path,
                    e.to_string()
                );
            }
        };
        let profile = match config.section(Some(profile_name)) {
            Some(p) => p,
            None => {
                return ia_err!(
                    "error reading SeaTable config file '{}': missing profile '{}'",
                    file_path,
                    profile_name
                );
            }
        };
        let api_token = match profile.get(API_TOKEN) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                return ia_err!(
                    "error reading SeaTable config file '{}': missing field '{}'",
                    file_path,
                    API_TOKEN
                );
            }
        };
        let timeout = match profile.get(TIMEOUT_SECS) {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return ia_err!(
                        "invalid value '{}' for '{}' in SeaTable config file '{}'",
                        v,
                        TIMEOUT_SECS,
                        file_path
                    );
                }
            },
            None => None,
        };
        Ok(ConfigFileSettings {
            api_token,
            endpoint: profile.get(ENDPOINT).map(|s| s.to_string()),
            cache_file: profile.get(CACHE_FILE).map(|s| s.to_string()),
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::Write;

    fn write_config(contents: &str) -> Result<tempfile::NamedTempFile, Box<dyn Error>> {
        let mut f = tempfile::NamedTempFile::new()?;
        f.write_all(contents.as_bytes())?;
        f.flush()?;
        Ok(f)
    }

    #[test]
    fn reads_default_profile() -> Result<(), Box<dyn Error>> {
        let f = write_config(
            "[DEFAULT]\napi_token=abc123\nendpoint=https://seatable.example.com\ntimeout_secs=15\n",
        )?;
        let path = f.path().to_str().ok_or("bad path")?;
        let s = ConfigFileSettings::new_from_file(path, DEFAULT_PROFILE)?;
        assert_eq!(s.api_token, "abc123");
        assert_eq!(s.endpoint.as_deref(), Some("https://seatable.example.com"));
        assert_eq!(s.timeout, Some(Duration::from_secs(15)));
        assert!(s.cache_file.is_none());
        Ok(())
    }

    #[test]
    fn reads_named_profile() -> Result<(), Box<dyn Error>> {
        let f = write_config("[DEFAULT]\napi_token=one\n\n[staging]\napi_token=two\n")?;
        let path = f.path().to_str().ok_or("bad path")?;
        let s = ConfigFileSettings::new_from_file(path, "staging")?;
        assert_eq!(s.api_token, "two");
        Ok(())
    }

    #[test]
    fn missing_token_is_an_error() -> Result<(), Box<dyn Error>> {
        let f = write_config("[DEFAULT]\nendpoint=https://x\n")?;
        let path = f.path().to_str().ok_or("bad path")?;
        assert!(ConfigFileSettings::new_from_file(path, DEFAULT_PROFILE).is_err());
        assert!(ConfigFileSettings::new_from_file(path, "nope").is_err());
        Ok(())
    }
}
