//! Error types for the vehicle API client.
//!
//! # Design
//! `NotFound`, `Conflict` and `Validation` get dedicated variants because
//! callers distinguish them; every other non-2xx response lands in
//! `HttpError` with the raw status code and body for debugging.
//!
//! `ErrorKind` is the coarse taxonomy that survives the call adapter
//! boundary, so callers can branch on the class of failure without
//! matching on message text.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the client, transport and service layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404; the requested vehicle does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 409; a vehicle with the same id already exists.
    #[error("conflict: {body}")]
    Conflict { body: String },

    /// The server rejected the payload (400 or 422).
    #[error("validation failed (HTTP {status}): {body}")]
    Validation { status: u16, body: String },

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The server could not be reached or the connection broke.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The server answered for a different vehicle than the one requested.
    #[error("identifier mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },

    /// The caller supplied input the client refuses to send.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound
            | ApiError::Conflict { .. }
            | ApiError::Validation { .. }
            | ApiError::HttpError { .. } => ErrorKind::Server,
            ApiError::Network(_) | ApiError::Timeout => ErrorKind::Network,
            ApiError::DeserializationError(_) | ApiError::IdMismatch { .. } => ErrorKind::Decode,
            ApiError::InvalidInput(_) => ErrorKind::Invalid,
            ApiError::SerializationError(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Validation { status, .. } | ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure classes preserved across the call adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unreachable host, broken connection, timeout.
    Network,
    /// Malformed or unexpected response body.
    Decode,
    /// Non-success status code; the exact code travels alongside.
    Server,
    /// Input rejected locally before any request was sent.
    Invalid,
    /// The caller's cancellation token fired before completion.
    Cancelled,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Decode => "decode",
            ErrorKind::Server => "server",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_server_kind() {
        assert_eq!(ApiError::NotFound.kind(), ErrorKind::Server);
        assert_eq!(ApiError::NotFound.status(), Some(404));
        let conflict = ApiError::Conflict { body: String::new() };
        assert_eq!(conflict.kind(), ErrorKind::Server);
        assert_eq!(conflict.status(), Some(409));
        let http = ApiError::HttpError {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(http.status(), Some(503));
    }

    #[test]
    fn transport_errors_are_network_kind() {
        assert_eq!(ApiError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(ApiError::Network("refused".to_string()).kind(), ErrorKind::Network);
        assert_eq!(ApiError::Timeout.status(), None);
    }

    #[test]
    fn body_errors_are_decode_kind() {
        assert_eq!(
            ApiError::DeserializationError("eof".to_string()).kind(),
            ErrorKind::Decode
        );
        let mismatch = ApiError::IdMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        assert_eq!(mismatch.kind(), ErrorKind::Decode);
    }

    #[test]
    fn display_is_human_readable() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(ApiError::NotFound.to_string(), "resource not found");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::Cancelled).unwrap();
        assert_eq!(json, "cancelled");
    }
}
