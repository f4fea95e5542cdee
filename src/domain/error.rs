use thiserror::Error;

use crate::domain::user::UserValidationError;

/// Core domain errors
///
/// A closed set of outcomes. Callers match on the variant; the message text
/// is for humans only.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] UserValidationError),

    #[error("user '{id}' not found")]
    UserNotFound { id: String },

    #[error("users not found")]
    UsersNotFound,

    #[error("invalid page number {page}, enter a number greater than 0")]
    InvalidPageNumber { page: i64 },

    #[error("email '{email}' already exists, please try again with another email")]
    EmailAlreadyExists { email: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Stable, machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.rule(),
            Self::UserNotFound { .. } => "user_not_found",
            Self::UsersNotFound => "users_not_found",
            Self::InvalidPageNumber { .. } => "invalid_page_number",
            Self::EmailAlreadyExists { .. } => "email_already_exists",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::Storage { .. } => "storage_error",
            Self::Configuration { .. } => "configuration_error",
        }
    }
}
