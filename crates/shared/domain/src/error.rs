//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (database, job queues).
//! Expected outcomes such as "not found" or "not allowed" are not errors;
//! they are carried by [`crate::Outcome`].

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A shortcode lookup referenced a code that does not exist
    #[error("Shortcode {0} does not exist")]
    UnknownShortcode(String),

    /// A subscription plan operation was invoked on the wrong kind of plan
    #[error("Subscription plan {0} does not support this operation")]
    WrongPlanKind(String),

    /// A stored value could not be mapped back into a domain value
    #[error("Corrupt {field}: {value}")]
    Corrupt { field: &'static str, value: String },

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create an unknown shortcode error
    pub fn unknown_shortcode(code: impl Into<String>) -> Self {
        DomainError::UnknownShortcode(code.into())
    }

    /// Create a corrupt value error
    pub fn corrupt(field: &'static str, value: impl Into<String>) -> Self {
        DomainError::Corrupt {
            field,
            value: value.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
