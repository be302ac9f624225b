//! Domain-level errors.
//!
//! Raised while assembling domain structures at startup. Client query
//! failures have their own type, `QueryError`.

use thiserror::Error;

/// Domain-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The identifier column is not part of a resource's whitelist
    #[error("primary key '{0}' is not a whitelisted column")]
    UnknownPrimaryKey(String),
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
