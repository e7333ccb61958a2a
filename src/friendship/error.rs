//! Error types for friendship operations.
//!
//! Every failure surfaced to a caller carries a stable [`ErrorKind`] and a
//! human-readable message. Raw `SQLite` errors are classified on conversion
//! so that uniqueness races and transient connection failures can be told
//! apart from genuine defects.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Error type for friendship operations.
#[derive(Error, Debug)]
pub enum FriendshipError {
    /// Referenced user or required edge does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Action not permitted given the current edge status.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Storage-level uniqueness race.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction or connection failure. Safe to retry the whole action.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored data could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Any other database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),
}

/// Stable classification of a [`FriendshipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`FriendshipError::NotFound`].
    NotFound,
    /// See [`FriendshipError::InvalidTransition`].
    InvalidTransition,
    /// See [`FriendshipError::ConstraintViolation`].
    ConstraintViolation,
    /// See [`FriendshipError::StorageUnavailable`].
    StorageUnavailable,
    /// Corrupt data or an unexpected database failure.
    Internal,
}

impl FriendshipError {
    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::InvalidData(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns whether the whole action may be retried from scratch.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<rusqlite::Error> for FriendshipError {
    fn from(err: rusqlite::Error) -> Self {
        let failure = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some((failure.code, failure.extended_code)),
            _ => None,
        };
        let Some((code, extended_code)) = failure else {
            return Self::Database(err);
        };

        match code {
            ErrorCode::ConstraintViolation
                if extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::ConstraintViolation(err.to_string())
            }
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::OutOfMemory => Self::StorageUnavailable(err.to_string()),
            _ => Self::Database(err),
        }
    }
}

/// Result type alias for friendship operations.
pub type Result<T> = std::result::Result<T, FriendshipError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn not_found_error_display() {
        let err = FriendshipError::NotFound("user 7".to_string());
        assert_eq!(err.to_string(), "Not found: user 7");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn invalid_transition_error_display() {
        let err = FriendshipError::InvalidTransition("already accepted".to_string());
        assert_eq!(err.to_string(), "Invalid transition: already accepted");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn storage_unavailable_is_retryable() {
        let err = FriendshipError::StorageUnavailable("busy".to_string());
        assert!(err.is_retryable());
        assert!(!FriendshipError::NotFound("x".to_string()).is_retryable());
        assert!(!FriendshipError::ConstraintViolation("x".to_string()).is_retryable());
    }

    #[test]
    fn unique_constraint_maps_to_constraint_violation() {
        let err: FriendshipError = sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE).into();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn check_constraint_is_not_a_uniqueness_race() {
        let err: FriendshipError = sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn busy_maps_to_storage_unavailable() {
        let err: FriendshipError = sqlite_failure(rusqlite::ffi::SQLITE_BUSY).into();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

        let err: FriendshipError = sqlite_failure(rusqlite::ffi::SQLITE_LOCKED).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn query_returned_no_rows_is_internal() {
        let err: FriendshipError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().starts_with("Database error"));
    }
}
