use thiserror::Error;

use crate::domain::errors::ValidationError;

/// Failure taxonomy of the request pipeline
///
/// The API layer maps each variant to exactly one HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range input, rejected before persistence
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// Valid credential without the required privilege, or inactive account
    #[error("{0}")]
    Forbidden(String),

    /// Identifier has no live record
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Any other persistence or infrastructure failure
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.message().to_string())
    }
}
