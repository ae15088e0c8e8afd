//! Application-level error type used by the CLI layer.

use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;

/// Exit code for a `get` of a key that is not cached
pub const EXIT_MISS: i32 = 3;

/// Application-wide error type covering everything a command can fail with.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local file or stdio failure, with the path or stream involved
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this is a cache miss surfaced from a backend
    pub fn is_miss(&self) -> bool {
        matches!(self, AppError::Cache(e) if e.is_miss())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_miss() { EXIT_MISS } else { 1 }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_exit_code() {
        let err = AppError::from(CacheError::Miss);
        assert!(err.is_miss());
        assert_eq!(err.exit_code(), EXIT_MISS);
    }

    #[test]
    fn test_other_errors_exit_one() {
        let err = AppError::from(CacheError::DeadlineExceeded);
        assert!(!err.is_miss());
        assert_eq!(err.exit_code(), 1);

        let err = AppError::io(
            "reading /tmp/cert.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("reading /tmp/cert.pem"));
    }
}
