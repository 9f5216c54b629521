//! Shared error type across routemeter crates.

use thiserror::Error;

use crate::registry::SeriesKind;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A series name was pre-registered twice.
    DuplicateSeries,
    /// A series name is held by the other series kind.
    KindMismatch,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateSeries => "DUPLICATE_SERIES",
            ErrorCode::KindMismatch => "KIND_MISMATCH",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RouteMeterError>;

/// Unified error type used by core and http crates.
#[derive(Debug, Error)]
pub enum RouteMeterError {
    #[error("series already registered: {0}")]
    DuplicateSeries(String),
    #[error("series {name} is a {found}, expected a {expected}")]
    KindMismatch {
        name: String,
        expected: SeriesKind,
        found: SeriesKind,
    },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RouteMeterError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RouteMeterError::DuplicateSeries(_) => ErrorCode::DuplicateSeries,
            RouteMeterError::KindMismatch { .. } => ErrorCode::KindMismatch,
            RouteMeterError::BadConfig(_) => ErrorCode::BadConfig,
            RouteMeterError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            RouteMeterError::Internal(_) => ErrorCode::Internal,
        }
    }
}
