//! Cache error types.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// [`CacheError::Miss`] is the only variant a certificate manager should treat
/// as "not cached"; everything else is a real failure.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,

    #[error("Cache operation cancelled")]
    Cancelled,

    #[error("Cache operation deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

impl CacheError {
    /// Returns true for the distinguished cache-miss condition.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }

    /// Returns true when the caller's context ended the operation.
    pub fn is_context_error(&self) -> bool {
        matches!(self, CacheError::Cancelled | CacheError::DeadlineExceeded)
    }

    /// Generic failure, mostly for caller-supplied functions.
    pub fn operation(message: impl Into<String>) -> Self {
        CacheError::Operation(message.into())
    }

    /// Status code of the backing store, if the error came from it.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            CacheError::Store(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Canonical status codes reported by the document store.
///
/// Mirrors the `google.rpc.Code` set used by Firestore error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    /// Parse the `status` string of a Firestore error body.
    pub fn from_status_name(name: &str) -> Option<Self> {
        let code = match name {
            "CANCELLED" => StatusCode::Cancelled,
            "UNKNOWN" => StatusCode::Unknown,
            "INVALID_ARGUMENT" => StatusCode::InvalidArgument,
            "DEADLINE_EXCEEDED" => StatusCode::DeadlineExceeded,
            "NOT_FOUND" => StatusCode::NotFound,
            "ALREADY_EXISTS" => StatusCode::AlreadyExists,
            "PERMISSION_DENIED" => StatusCode::PermissionDenied,
            "RESOURCE_EXHAUSTED" => StatusCode::ResourceExhausted,
            "FAILED_PRECONDITION" => StatusCode::FailedPrecondition,
            "ABORTED" => StatusCode::Aborted,
            "OUT_OF_RANGE" => StatusCode::OutOfRange,
            "UNIMPLEMENTED" => StatusCode::Unimplemented,
            "INTERNAL" => StatusCode::Internal,
            "UNAVAILABLE" => StatusCode::Unavailable,
            "DATA_LOSS" => StatusCode::DataLoss,
            "UNAUTHENTICATED" => StatusCode::Unauthenticated,
            _ => return None,
        };
        Some(code)
    }

    /// Best-effort mapping used when the error body carries no status.
    pub fn from_http(status: u16) -> Self {
        match status {
            400 => StatusCode::InvalidArgument,
            401 => StatusCode::Unauthenticated,
            403 => StatusCode::PermissionDenied,
            404 => StatusCode::NotFound,
            409 => StatusCode::Aborted,
            412 => StatusCode::FailedPrecondition,
            429 => StatusCode::ResourceExhausted,
            499 => StatusCode::Cancelled,
            501 => StatusCode::Unimplemented,
            503 => StatusCode::Unavailable,
            504 => StatusCode::DeadlineExceeded,
            500..=599 => StatusCode::Internal,
            _ => StatusCode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by a document store, with its structured status preserved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Document store error {code}: {message}")]
pub struct StoreError {
    pub code: StatusCode,
    /// HTTP status of the response, when the store speaks HTTP.
    pub http_status: Option<u16>,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            http_status: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StatusCode::NotFound
    }
}
