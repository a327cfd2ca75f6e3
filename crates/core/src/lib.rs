//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Store-assigned identifiers for subjects, roles and permissions.
pub mod ids;
/// Offset pagination primitives.
pub mod page;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ids::{PermissionId, RoleId, SubjectId};
pub use page::PageRequest;

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced subject, role or permission does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state, such as a taken name.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No subject could be resolved for the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Subject is resolved but lacks the required permission or role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backing store failure, propagated without retry.
    #[error("internal error: {0}")]
    Internal(String),
}
