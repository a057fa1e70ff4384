//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree's rules.
/// These are independent of storage and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{what} cannot be empty")]
    EmptyTitle { what: &'static str },

    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Parent node '{0}' not found")]
    ParentNotFound(String),

    #[error("Cannot delete the root node")]
    RootDeletion,

    #[error("Failed to delete node '{0}'")]
    DetachFailed(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Reject blank titles; returns the title trimmed.
pub fn require_title<'a>(title: &'a str, what: &'static str) -> DomainResult<&'a str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyTitle { what });
    }
    Ok(trimmed)
}
