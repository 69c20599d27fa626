// ==========================================
// Dual Meet APS - API error type
// ==========================================
// Converts repository failures into caller-inspectable kinds.
// Every message carries an explicit reason.
// ==========================================

use crate::repository::error::RepositoryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // business errors
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("state violation: {0}")]
    StateViolation(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    // ==========================================
    // conflicts
    // ==========================================
    #[error("meet {meet_id} is being edited by {holder_name} until {expires_at}")]
    LockConflict {
        meet_id: String,
        holder_id: String,
        holder_name: String,
        expires_at: NaiveDateTime,
    },

    #[error("duplicate pair: {0}")]
    DuplicatePair(String),

    // ==========================================
    // data access
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    // ==========================================
    // generic
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    StateViolation,
    PermissionDenied,
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::LockConflict { .. } | ApiError::DuplicatePair(_) => ErrorKind::Conflict,
            ApiError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApiError::StateViolation(_) => ErrorKind::StateViolation,
            ApiError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Only an edit-lock conflict is worth retrying; everything else is
    /// bad input or a stale record
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::LockConflict { .. })
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("connection lock failed: {}", msg))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicatePair(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::NotFound(format!("referenced record missing: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("stored field {} is invalid: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Meet".to_string(),
            id: "M001".to_string(),
        }
        .into();
        match &api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Meet"));
                assert!(msg.contains("M001"));
            }
            _ => panic!("Expected NotFound"),
        }
        assert_eq!(api_err.kind(), ErrorKind::NotFound);

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".to_string()).into();
        assert_eq!(api_err.kind(), ErrorKind::Conflict);
        assert!(!api_err.is_retryable());
    }

    #[test]
    fn test_only_lock_conflict_is_retryable() {
        let conflict = ApiError::LockConflict {
            meet_id: "m".to_string(),
            holder_id: "u2".to_string(),
            holder_name: "Coach Two".to_string(),
            expires_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(10, 2, 0)
                .unwrap(),
        };
        assert!(conflict.is_retryable());
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.to_string().contains("Coach Two"));

        assert!(!ApiError::StateViolation("x".to_string()).is_retryable());
        assert!(!ApiError::InvalidInput("x".to_string()).is_retryable());
    }
}
