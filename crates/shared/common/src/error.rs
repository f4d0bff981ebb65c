//! Unified error handling for the commerce services.
//!
//! `AppError` covers truly exceptional conditions only: database failures,
//! queue failures, invalid input and programmer errors. Expected outcomes
//! (missing record, missing permission) travel as `domain::Outcome` values.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Job queue error: {0}")]
    Queue(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Queue(_) => "QUEUE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(msg) => {
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }

            // Hide details for internal errors
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Queue(msg) => {
                tracing::error!("Job queue error: {}", msg);
                "A background job could not be queued".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound
                | AppError::Conflict(_)
                | AppError::Validation(_)
                | AppError::BadRequest(_)
        )
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::UnknownShortcode(_) => AppError::NotFound,
            DomainError::WrongPlanKind(plan) => AppError::BadRequest(format!(
                "Subscription plan {} does not support this operation",
                plan
            )),
            err @ DomainError::Corrupt { .. } => AppError::Internal(err.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        AppError::Queue(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(DomainError::validation("bad")),
            AppError::Validation(msg) if msg == "bad"
        ));
        assert!(matches!(
            AppError::from(DomainError::unknown_shortcode("1234")),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(DomainError::WrongPlanKind("Monthly".to_string())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::corrupt("owner_type", "order")),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = AppError::internal("connection pool exhausted");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.is_client_error());
    }

    #[test]
    fn conflict_message_is_not_duplicated() {
        assert_eq!(AppError::conflict("Code").user_message(), "Code already exists");
        assert_eq!(
            AppError::conflict("Code already exists").user_message(),
            "Code already exists"
        );
    }
}
