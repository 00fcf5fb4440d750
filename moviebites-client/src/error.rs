//! Error types for the client crate.
//!
//! Every request failure, whatever its cause, is delivered as an
//! [`ApiError`]: a JSON object carrying at least a readable message, tagged
//! with where it came from.

use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field every synthesized error body carries.
pub const MESSAGE_FIELD: &str = "message";
const ERROR_FIELD: &str = "error";
const UNKNOWN_ERROR: &str = "Unknown API error";

/// Result of a request through the pipeline.
pub type ApiResult<T> = Result<T, ApiError>;
/// Result of an identity store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Where a normalized error originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// The server was never reached or the exchange broke off (DNS,
    /// connection refused, timeout).
    Transport,
    /// The server answered with a non-success status.
    Server { status: u16 },
    /// A request value could not be turned into query params or a body.
    Encode,
    /// A successful payload did not match the requested type.
    Decode,
    /// The identity store failed while the request was being handled.
    Storage,
}

/// Normalized request failure.
///
/// For server errors the body is the server's error object verbatim; every
/// other origin carries a synthesized `{ "message": ... }` object.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    origin: ErrorOrigin,
    body: Map<String, Value>,
}

impl ApiError {
    fn with_message(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = UNKNOWN_ERROR.to_string();
        }
        let mut body = Map::new();
        body.insert(MESSAGE_FIELD.to_string(), Value::String(message));
        Self { origin, body }
    }

    /// The server could not be reached; `message` is the transport error text.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::with_message(ErrorOrigin::Transport, message)
    }

    /// A request value could not be serialized.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::with_message(ErrorOrigin::Encode, message)
    }

    /// A payload did not match the requested type.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::with_message(ErrorOrigin::Decode, message)
    }

    /// Normalize a non-success response body.
    ///
    /// JSON objects are kept as-is. Other JSON scalars and plain text become
    /// the message. An empty body falls back to a status line.
    pub fn from_server_body(status: StatusCode, raw: &[u8]) -> Self {
        let origin = ErrorOrigin::Server {
            status: status.as_u16(),
        };
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(body)) => Self { origin, body },
            Ok(Value::String(text)) if !text.trim().is_empty() => {
                Self::with_message(origin, text)
            }
            Ok(Value::Null) | Ok(Value::String(_)) => {
                Self::with_message(origin, status_line(status))
            }
            Ok(other) => Self::with_message(origin, other.to_string()),
            Err(_) => {
                let text = String::from_utf8_lossy(raw);
                let text = text.trim();
                if text.is_empty() {
                    Self::with_message(origin, status_line(status))
                } else {
                    Self::with_message(origin, text)
                }
            }
        }
    }

    /// Where the failure came from.
    pub fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    /// HTTP status when the server produced this error.
    pub fn status(&self) -> Option<u16> {
        match self.origin {
            ErrorOrigin::Server { status } => Some(status),
            _ => None,
        }
    }

    /// True when the server was never reached.
    pub fn is_transport(&self) -> bool {
        self.origin == ErrorOrigin::Transport
    }

    /// The normalized error object.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consume the error, keeping the normalized object.
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    /// The normalized object as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }

    /// Human-readable description.
    ///
    /// Taken from the `message` field, then the `error` field, then a fixed
    /// fallback; never empty.
    pub fn message(&self) -> &str {
        [MESSAGE_FIELD, ERROR_FIELD]
            .iter()
            .filter_map(|field| self.body.get(*field))
            .find_map(|value| value.as_str().filter(|s| !s.is_empty()))
            .unwrap_or(UNKNOWN_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            ErrorOrigin::Server { status } => {
                write!(f, "{} (status {})", self.message(), status)
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::with_message(ErrorOrigin::Storage, err.to_string())
    }
}

fn status_line(status: StatusCode) -> String {
    format!("Request failed with status {}", status)
}

/// Identity store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file exists but could not be read.
    #[error("failed to read identity store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store file could not be written.
    #[error("failed to write identity store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store file is not a JSON object of strings.
    #[error("identity store {path} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The backing storage is not reachable at all.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

/// Failures while constructing an [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// TLS or connector setup failed.
    #[error("failed to build HTTP client")]
    Http(#[from] reqwest::Error),
    /// The configured key cannot be sent as `X-API-KEY`.
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transport_error_carries_the_failure_message() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_value(), json!({ "message": "connection refused" }));
        assert_eq!(err.message(), "connection refused");
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn empty_transport_message_is_replaced() {
        assert_eq!(ApiError::transport("  ").message(), UNKNOWN_ERROR);
    }

    #[test]
    fn server_object_body_is_kept_verbatim() {
        let err = ApiError::from_server_body(
            StatusCode::BAD_REQUEST,
            br#"{"error":"bad input"}"#,
        );
        assert_eq!(err.to_value(), json!({ "error": "bad input" }));
        assert_eq!(err.message(), "bad input");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = ApiError::from_server_body(
            StatusCode::BAD_GATEWAY,
            b"upstream exploded\n",
        );
        assert_eq!(err.to_value(), json!({ "message": "upstream exploded" }));
    }

    #[test]
    fn empty_body_falls_back_to_status_line() {
        let err = ApiError::from_server_body(StatusCode::NOT_FOUND, b"");
        assert_eq!(
            err.message(),
            "Request failed with status 404 Not Found"
        );
    }

    #[test]
    fn object_without_message_fields_still_displays() {
        let err = ApiError::from_server_body(
            StatusCode::CONFLICT,
            br#"{"code":17}"#,
        );
        assert_eq!(err.message(), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "Unknown API error (status 409)");
    }

    #[test]
    fn store_errors_normalize_to_storage_origin() {
        let err: ApiError = StoreError::Unavailable("locked".into()).into();
        assert_eq!(err.origin(), ErrorOrigin::Storage);
        assert_eq!(err.message(), "identity store unavailable: locked");
    }
}
