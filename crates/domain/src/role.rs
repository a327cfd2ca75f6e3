use rolegate_core::{AppResult, NonEmptyString, RoleId};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Guard namespace applied when none is given.
pub const DEFAULT_GUARD_NAME: &str = "web";

/// Named bundle of permissions assignable to subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
    guard_name: NonEmptyString,
    permissions: Vec<Permission>,
}

impl Role {
    /// Creates a validated role.
    ///
    /// Permissions are a set: duplicates by id are collapsed and the result is
    /// ordered by id.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
        guard_name: Option<String>,
        mut permissions: Vec<Permission>,
    ) -> AppResult<Self> {
        permissions.sort_by_key(Permission::id);
        permissions.dedup_by_key(|permission| permission.id());

        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description,
            guard_name: normalize_guard_name(guard_name)?,
            permissions,
        })
    }

    /// Returns the store identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique, case-sensitive role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the guard namespace.
    #[must_use]
    pub fn guard_name(&self) -> &str {
        self.guard_name.as_str()
    }

    /// Returns the permissions carried by this role.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns whether the role carries a permission with this exact name.
    #[must_use]
    pub fn grants(&self, permission_name: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.name() == permission_name)
    }
}

/// Applies [`DEFAULT_GUARD_NAME`] when no guard is given. A given guard must
/// not be blank.
pub fn normalize_guard_name(guard_name: Option<String>) -> AppResult<NonEmptyString> {
    NonEmptyString::new(guard_name.unwrap_or_else(|| DEFAULT_GUARD_NAME.to_owned()))
}
