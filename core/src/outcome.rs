//! Result-wrapping call adapter.
//!
//! # Design
//! `safe_call` runs one remote operation exactly once and folds every way it
//! can go wrong (an `ApiError`, or a panic) into `Outcome::Failure`. Nothing
//! escapes the adapter, and it never retries. The structured `ErrorKind` and
//! HTTP status travel with the message so callers can branch without parsing
//! text.
//!
//! `safe_call_cancellable` ties the operation to a `CancellationToken` owned
//! by the caller: when the token fires, the in-flight future is dropped and
//! the caller gets a `Cancelled` failure instead of a late result.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ApiError, ErrorKind};

/// Two-variant outcome of one remote operation.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

/// Why an operation failed, as seen past the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    /// HTTP status of the response that caused the failure, if there was one.
    pub status: Option<u16>,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::Server && self.status == Some(404)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Self {
            kind: err.kind(),
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, ApiError>> for Outcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err.into()),
        }
    }
}

/// Run `operation` once and normalize its result.
pub async fn safe_call<T, F, Fut>(operation: F) -> Outcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    // The closure runs inside the guarded future so a panic while building
    // the future is caught too.
    let guarded = AssertUnwindSafe(async move { operation().await }).catch_unwind();
    match guarded.await {
        Ok(Ok(value)) => {
            debug!("remote call succeeded");
            Outcome::Success(value)
        }
        Ok(Err(err)) => {
            let failure = Failure::from(err);
            warn!(kind = %failure.kind, status = ?failure.status, error = %failure.message, "remote call failed");
            Outcome::Failure(failure)
        }
        Err(payload) => {
            let failure = Failure::new(ErrorKind::Unknown, panic_message(payload.as_ref()));
            warn!(error = %failure.message, "remote call panicked");
            Outcome::Failure(failure)
        }
    }
}

/// Like `safe_call`, but gives up as soon as `token` is cancelled.
pub async fn safe_call_cancellable<T, F, Fut>(token: &CancellationToken, operation: F) -> Outcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if token.is_cancelled() {
        return Outcome::Failure(Failure::cancelled());
    }
    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("remote call cancelled");
            Outcome::Failure(Failure::cancelled())
        }
        outcome = safe_call(operation) => outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("operation panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("operation panicked: {msg}")
    } else {
        "operation panicked".to_string()
    }
}
