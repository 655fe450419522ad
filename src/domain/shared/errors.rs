use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Vote state must be UPVOTE or DOWNVOTE, got {0:?}")]
    InvalidVoteState(String),
    #[error("Storage conflict: {0}")]
    StorageConflict(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Unauthorized")]
    Unauthorized,
}

impl DomainError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::StorageConflict(_) | DomainError::StorageUnavailable(_)
        )
    }
}

// SQLSTATE codes that mean "another writer got there first".
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION | SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                    DomainError::StorageConflict(db_err.message().to_string())
                }
                _ => DomainError::StorageUnavailable(err.to_string()),
            },
            sqlx::Error::RowNotFound => DomainError::NotFound("Record not found".into()),
            _ => DomainError::StorageUnavailable(err.to_string()),
        }
    }
}
