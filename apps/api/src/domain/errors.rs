// Domain error types
// Validation failures come from value objects, repository failures from adapters

use thiserror::Error;

/// Input rejected by a value object or a domain constructor
///
/// Raised before any persistence access takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Failure reported by a repository implementation
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// Any other storage failure
    #[error("storage failure: {0}")]
    Internal(String),
}
