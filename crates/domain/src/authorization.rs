//! Authorization evaluator over an already-loaded subject.
//!
//! Evaluation never touches a store. Callers hand in an [`AuthorizationSubject`]
//! loaded in one read, so the decision is made against one consistent snapshot.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Role, Subject};

/// Subject together with its roles and each role's permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSubject {
    subject: Subject,
    roles: Vec<Role>,
}

impl AuthorizationSubject {
    /// Creates a hydrated subject. Roles are a set ordered by id.
    #[must_use]
    pub fn new(subject: Subject, mut roles: Vec<Role>) -> Self {
        roles.sort_by_key(Role::id);
        roles.dedup_by_key(|role| role.id());
        Self { subject, roles }
    }

    /// Returns the subject attributes.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Returns the roles held by the subject.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns the distinct permission names reachable through held roles.
    #[must_use]
    pub fn permission_names(&self) -> Vec<&str> {
        let mut names = self
            .roles
            .iter()
            .flat_map(|role| role.permissions().iter().map(|permission| permission.name()))
            .collect::<Vec<_>>();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn holds_permission(&self, permission_name: &str) -> bool {
        self.roles.iter().any(|role| role.grants(permission_name))
    }

    fn holds_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|role| role.name() == role_name)
    }
}

/// What a guarded operation requires of the current subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum AccessRequirement {
    /// Some held role must carry this permission name.
    Permission(String),
    /// The subject must hold a role with this name.
    Role(String),
}

impl AccessRequirement {
    /// Requires a permission by name.
    #[must_use]
    pub fn permission(name: impl Into<String>) -> Self {
        Self::Permission(name.into())
    }

    /// Requires a role by name.
    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self::Role(name.into())
    }

    /// Evaluates the requirement against an optional subject.
    #[must_use]
    pub fn evaluate(&self, subject: Option<&AuthorizationSubject>) -> AccessDecision {
        match self {
            Self::Permission(name) => evaluate_permission(subject, name),
            Self::Role(name) => evaluate_role(subject, name),
        }
    }
}

impl Display for AccessRequirement {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permission(name) => write!(formatter, "permission '{name}'"),
            Self::Role(name) => write!(formatter, "role '{name}'"),
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access granted.
    Allowed,
    /// No subject was supplied; surfaced as an authentication failure.
    Unauthenticated,
    /// Subject supplied but the requirement is not met.
    Denied,
}

impl AccessDecision {
    /// Returns whether access is granted.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether the subject holds a permission.
///
/// Superusers are allowed without looking at roles. Otherwise the first held
/// role carrying an exact name match allows.
#[must_use]
pub fn evaluate_permission(
    subject: Option<&AuthorizationSubject>,
    permission_name: &str,
) -> AccessDecision {
    let Some(subject) = subject else {
        return AccessDecision::Unauthenticated;
    };

    if subject.subject.is_superuser() || subject.holds_permission(permission_name) {
        return AccessDecision::Allowed;
    }

    AccessDecision::Denied
}

/// Decides whether the subject holds a role by name.
#[must_use]
pub fn evaluate_role(subject: Option<&AuthorizationSubject>, role_name: &str) -> AccessDecision {
    let Some(subject) = subject else {
        return AccessDecision::Unauthenticated;
    };

    if subject.subject.is_superuser() || subject.holds_role(role_name) {
        return AccessDecision::Allowed;
    }

    AccessDecision::Denied
}

/// Boolean form of [`evaluate_permission`]; absent subjects are denied.
#[must_use]
pub fn has_permission(subject: Option<&AuthorizationSubject>, permission_name: &str) -> bool {
    evaluate_permission(subject, permission_name).is_allowed()
}

/// Boolean form of [`evaluate_role`]; absent subjects are denied.
#[must_use]
pub fn has_role(subject: Option<&AuthorizationSubject>, role_name: &str) -> bool {
    evaluate_role(subject, role_name).is_allowed()
}

#[cfg(test)]
mod tests;
