//! Error handling for the DevGeeks client

use std::fmt;
use thiserror::Error;

use serde::Deserialize;

/// Postgres error code for a unique-constraint violation, as reported by the
/// backing service. Part of the external service contract; call sites must go
/// through [`Error::is_unique_violation`] instead of matching this value.
pub(crate) const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Structured error body returned by the backend's REST layer.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorDetails {
    /// Backend-specific error code (e.g. a Postgres SQLSTATE)
    pub code: Option<String>,

    /// Human-readable message
    #[serde(alias = "msg", alias = "error_description")]
    pub message: Option<String>,

    /// Additional detail text
    pub details: Option<String>,

    /// Hint text
    pub hint: Option<String>,

    /// HTTP status the body arrived with
    #[serde(skip)]
    pub status: u16,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("code {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if parts.is_empty() {
            parts.push(format!("status {}", self.status));
        }
        write!(f, "{}", parts.join(": "))
    }
}

impl ApiErrorDetails {
    /// Fallback details when the backend returns a non-JSON error body.
    pub(crate) fn unparsed(status: u16, body: &str) -> Self {
        Self {
            code: None,
            message: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
            details: None,
            hint: None,
            status,
        }
    }
}

/// Unified error type for the DevGeeks client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local input validation failure; no network call was made
    #[error("{0}")]
    Validation(String),

    /// Authentication failure; the message is the backend's, verbatim
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected a read or write
    #[error("Request rejected: {0}")]
    RemoteWrite(ApiErrorDetails),

    /// An application already exists for this (job, user) pair
    #[error("You have already applied to this job")]
    DuplicateApplication,

    /// Object storage failure; the form remains populated and may be resubmitted
    #[error("Upload error: {0}")]
    Upload(String),

    /// A mutation targeted a record that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Realtime subscription errors
    #[error("Realtime error: {0}")]
    Realtime(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new upload error
    pub fn upload<T: fmt::Display>(msg: T) -> Self {
        Error::Upload(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new realtime error
    pub fn realtime<T: fmt::Display>(msg: T) -> Self {
        Error::Realtime(msg.to_string())
    }

    /// Whether this error is the backend's unique-constraint violation.
    ///
    /// This is the symbolic condition the application flow uses to detect a
    /// duplicate submission; the underlying code is backend-specific.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::RemoteWrite(details) => {
                details.code.as_deref() == Some(UNIQUE_VIOLATION_CODE)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_detected_by_code() {
        let err = Error::RemoteWrite(ApiErrorDetails {
            code: Some("23505".to_string()),
            message: Some("duplicate key value violates unique constraint".to_string()),
            status: 409,
            ..Default::default()
        });
        assert!(err.is_unique_violation());
    }

    #[test]
    fn other_codes_are_not_unique_violations() {
        let err = Error::RemoteWrite(ApiErrorDetails {
            code: Some("23503".to_string()),
            status: 409,
            ..Default::default()
        });
        assert!(!err.is_unique_violation());
        assert!(!Error::auth("nope").is_unique_violation());
    }

    #[test]
    fn details_display_prefers_code_and_message() {
        let details = ApiErrorDetails {
            code: Some("42501".to_string()),
            message: Some("permission denied".to_string()),
            status: 403,
            ..Default::default()
        };
        assert_eq!(details.to_string(), "code 42501: permission denied");

        let empty = ApiErrorDetails::unparsed(500, "");
        assert_eq!(empty.to_string(), "status 500");
    }
}
