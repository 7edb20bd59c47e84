//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors that can occur while building report values from user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A calendar date did not match `YYYY-MM-DD`
    #[error("Invalid date '{value}': {reason} (expected YYYY-MM-DD)")]
    InvalidDate { value: String, reason: String },

    /// The date window could not be widened past its end date
    #[error("Date out of range: {value}")]
    DateOutOfRange { value: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
