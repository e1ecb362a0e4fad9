//! Registry error types.

use thiserror::Error;

use crate::store::StorageError;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record exists for the requested id.
    #[error("agent not found: {id}")]
    NotFound { id: String },

    /// Malformed input fields on create/update, rejected before any write.
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
