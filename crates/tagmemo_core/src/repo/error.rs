//! Repository error taxonomy shared by note, tag and user persistence.
//!
//! # Invariants
//! - `NotFound` is the only kind callers are expected to show to users.
//! - Transient backend failures are classified as `StorageUnavailable` so the
//!   caller can retry the whole unit of work.

use crate::db::DbError;
use crate::model::note::NoteValidationError;
use crate::model::user::UserValidationError;
use rusqlite::ErrorCode;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Target row does not exist for the requesting principal.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// Busy, locked or unreachable backend.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] DbError),
    /// Uniqueness or foreign-key rule rejected a write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error(transparent)]
    NoteValidation(#[from] NoteValidationError),
    #[error(transparent)]
    UserValidation(#[from] UserValidationError),
    /// Persisted row could not be decoded.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Db(DbError),
}

impl RepoError {
    pub(crate) fn note_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "note",
            id: id.to_string(),
        }
    }

    pub(crate) fn user_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "user",
            id: id.to_string(),
        }
    }

    /// Whether retrying the same unit of work may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match sqlite_code(&value) {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(value.to_string()),
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull,
            ) => Self::StorageUnavailable(DbError::Sqlite(value)),
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Returns true when `err` is a UNIQUE/PRIMARY KEY rejection.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

fn sqlite_code(err: &rusqlite::Error) -> Option<ErrorCode> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::RepoError;
    use rusqlite::ffi;

    fn failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn busy_errors_are_retryable_storage_failures() {
        let err = RepoError::from(failure(ffi::SQLITE_BUSY));
        assert!(matches!(err, RepoError::StorageUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn unique_errors_map_to_constraint_violation() {
        let err = RepoError::from(failure(ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = RepoError::note_not_found("abc");
        assert_eq!(err.to_string(), "note not found: abc");
        assert!(err.is_not_found());
    }
}
