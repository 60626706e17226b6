//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use num_enum::TryFromPrimitive;

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

/// Enumeration of all possible errors returned by this library.
#[derive(Debug, Clone)]
pub struct SeaTableError {
    pub code: SeaTableErrorCode,
    pub message: String,
}

impl std::error::Error for SeaTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for SeaTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        return write!(f, "code={:?} message=\"{}\"", self.code, self.message);
    }
}

impl SeaTableError {
    pub fn new(code: SeaTableErrorCode, msg: &str) -> SeaTableError {
        SeaTableError {
            code,
            message: format!("{} ({})", msg, sdk_version()),
        }
    }

    pub fn from_int(icode: i32, msg: &str) -> SeaTableError {
        if let Ok(code) = SeaTableErrorCode::try_from(icode) {
            return SeaTableError::new(code, msg);
        }
        SeaTableError {
            code: SeaTableErrorCode::UnknownError,
            message: format!("Invalid integer error code {}", icode),
        }
    }

    /// Returns true if the caller may retry the operation at a later time.
    ///
    /// The client never retries internally.
    pub fn is_retryable(&self) -> bool {
        (self.code as i32) >= 100 && (self.code as i32) < 125
    }

    /// Returns true if the error came from the credential exchange rejecting the API token.
    pub fn is_auth_error(&self) -> bool {
        self.code == SeaTableErrorCode::Unauthorized || self.code == SeaTableErrorCode::Forbidden
    }
}

macro_rules! ia_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        SeaTableError {
            code: crate::error::SeaTableErrorCode::IllegalArgument,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        }
    }};
}

pub(crate) use ia_error;

macro_rules! ia_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(SeaTableError {
            code: crate::error::SeaTableErrorCode::IllegalArgument,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        })
    }};
}

pub(crate) use ia_err;

macro_rules! malformed_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(SeaTableError {
            code: crate::error::SeaTableErrorCode::MalformedResponse,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        })
    }};
}

pub(crate) use malformed_err;

impl From<reqwest::Error> for SeaTableError {
    fn from(e: reqwest::Error) -> Self {
        let code = {
            if e.is_timeout() {
                SeaTableErrorCode::RequestTimeout
            } else if e.is_connect() {
                SeaTableErrorCode::Unreachable
            } else if e.is_decode() {
                SeaTableErrorCode::MalformedResponse
            } else {
                match e.status().map(|s| s.as_u16()) {
                    Some(401) => SeaTableErrorCode::Unauthorized,
                    Some(403) => SeaTableErrorCode::Forbidden,
                    _ => SeaTableErrorCode::ServerError,
                }
            }
        };
        SeaTableError {
            code: code,
            message: format!(
                "reqwest error: {} ({})",
                e.to_string(),
                crate::error::sdk_version()
            ),
        }
    }
}

impl From<serde_json::Error> for SeaTableError {
    fn from(e: serde_json::Error) -> Self {
        SeaTableError {
            code: SeaTableErrorCode::MalformedResponse,
            message: format!(
                "invalid json: {} ({})",
                e.to_string(),
                crate::error::sdk_version()
            ),
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for SeaTableError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ia_error!("invalid header value: {}", e.to_string())
    }
}

impl From<url::ParseError> for SeaTableError {
    fn from(e: url::ParseError) -> Self {
        ia_error!("error parsing url: {}", e.to_string())
    }
}

impl From<chrono::ParseError> for SeaTableError {
    fn from(e: chrono::ParseError) -> Self {
        ia_error!("invalid datetime value: {}", e.to_string())
    }
}

impl From<std::io::Error> for SeaTableError {
    fn from(e: std::io::Error) -> Self {
        SeaTableError {
            code: SeaTableErrorCode::CacheError,
            message: format!(
                "i/o error: {} ({})",
                e.to_string(),
                crate::error::sdk_version()
            ),
        }
    }
}

// SeaTableErrorCode represents the error code.
// Error codes are divided into categories as follows:
//
// 1. Error codes for user-generated errors, range from 1 to 50(exclusive).
// These include illegal arguments, unknown tables or columns, missing rows.
//
// 2. Error codes for authorization and malformed remote data, range from 50
// to 100(exclusive). These are not retryable without user intervention.
//
// 3. Error codes for transport issues, range from 100 to 125(exclusive).
// These may succeed if the caller tries again later.
//
// 4. Other issues, begin from 125.
//
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum SeaTableErrorCode {
    /// NoError represents there is no error.
    NoError = 0,

    /// IllegalArgument error represents the application provided an illegal
    /// argument for the operation, or the handle is misconfigured.
    IllegalArgument = 1,

    /// TableNotFound error represents the named table does not exist in the
    /// base metadata.
    TableNotFound = 2,

    /// ColumnNotFound error represents the named column does not exist in the
    /// table's metadata, so its internal key cannot be resolved.
    ColumnNotFound = 3,

    /// NotFound error represents that no row matched the lookup used to
    /// locate an update target.
    NotFound = 4,

    /// Unauthorized error represents the credential exchange rejected the
    /// API token (HTTP 401). Check the configured API token.
    Unauthorized = 50,

    /// Forbidden error represents the API token is not permitted to access
    /// the base (HTTP 403).
    Forbidden = 51,

    /// MalformedResponse error represents the remote service returned a
    /// success status but the body lacked required fields or had an
    /// unexpected shape.
    MalformedResponse = 52,

    /// ExchangeFailed error represents any other failure of the credential
    /// exchange. The message carries the remote error detail, if any.
    ExchangeFailed = 53,

    /// QueryFailed error represents a failed server-side SQL query. It is
    /// recovered internally by falling back to a full fetch.
    QueryFailed = 54,

    /// UpdateFailed error represents a row update that the remote service
    /// did not accept.
    UpdateFailed = 55,

    /// RequestTimeout error represents the request did not complete within
    /// the configured timeout.
    RequestTimeout = 100,

    /// Unreachable error represents a DNS or connection failure reaching the
    /// remote service.
    Unreachable = 101,

    /// ServerError represents an unexpected http status from the remote service.
    ServerError = 102,

    /// UnknownError represents an unknown error has occurred.
    UnknownError = 125,

    /// CacheError represents a failure reading or writing the local cache store.
    CacheError = 126,
}
