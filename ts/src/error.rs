//! Store error types

use thiserror::Error;

use crate::TaskId;

/// Errors returned by [`crate::TaskStore`] operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Title was empty after trimming whitespace
    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Ambiguous task reference '{reference}' matches {} tasks", .candidates.len())]
    Ambiguous { reference: String, candidates: Vec<TaskId> },
}

impl StoreError {
    /// Check if this is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::EmptyTitle)
    }
}
