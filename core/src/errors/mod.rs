//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{KeyError, TokenError};

use thiserror::Error;

/// Errors surfaced by request-level operations
#[derive(Error, Debug)]
pub enum DomainError {
    /// Authenticated subject lacks administrative access
    #[error("Administrator access required for {subject}")]
    Forbidden { subject: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type DomainResult<T> = Result<T, DomainError>;
