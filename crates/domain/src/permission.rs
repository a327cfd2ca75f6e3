use rolegate_core::{AppResult, NonEmptyString, PermissionId};
use serde::{Deserialize, Serialize};

use crate::role::normalize_guard_name;

/// Atomic grantable capability, named by convention as `resource.action`.
///
/// The name and guard are fixed once created. Only the description may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    description: Option<String>,
    guard_name: NonEmptyString,
}

impl Permission {
    /// Creates a validated permission.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        description: Option<String>,
        guard_name: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description,
            guard_name: normalize_guard_name(guard_name)?,
        })
    }

    /// Returns the store identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
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

    /// Returns the `resource` half of a `resource.action` name, if present.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.name().split_once('.').map(|(resource, _)| resource)
    }
}

#[cfg(test)]
mod tests {
    use rolegate_core::PermissionId;

    use super::Permission;

    #[test]
    fn permission_defaults_guard_to_web() {
        let permission = Permission::new(PermissionId::from_i64(1), "users.edit", None, None)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(permission.guard_name(), "web");
    }

    #[test]
    fn permission_rejects_blank_name() {
        let permission = Permission::new(PermissionId::from_i64(1), "  ", None, None);
        assert!(permission.is_err());
    }

    #[test]
    fn permission_exposes_resource_segment() {
        let permission = Permission::new(PermissionId::from_i64(1), "users.view", None, None)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(permission.resource(), Some("users"));
    }
}
