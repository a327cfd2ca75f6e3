//! Subject domain types and validation rules.

use rolegate_core::{AppError, AppResult, SubjectId};
use serde::{Deserialize, Serialize};

/// Validated, lower-cased email address used as the subject natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Actor whose access is controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    email: EmailAddress,
    display_name: Option<String>,
    is_active: bool,
    is_superuser: bool,
}

impl Subject {
    /// Creates a subject from persisted attributes.
    #[must_use]
    pub fn new(
        id: SubjectId,
        email: EmailAddress,
        display_name: Option<String>,
        is_active: bool,
        is_superuser: bool,
    ) -> Self {
        Self {
            id,
            email,
            display_name,
            is_active,
            is_superuser,
        }
    }

    /// Returns the store identifier.
    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    /// Returns the unique email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns whether the subject is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the subject bypasses every permission and role check.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}
