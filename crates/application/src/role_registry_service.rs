use std::collections::BTreeSet;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult, NonEmptyString};
use tracing::warn;

use crate::rbac_ports::{PermissionRepository, RoleRepository};

mod permissions;
mod roles;


/// Handling of permission names that do not resolve when a role is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPermissionPolicy {
    /// Drop unresolved names and link the rest.
    #[default]
    Ignore,
    /// Fail with `NotFound` naming the unresolved permissions.
    Reject,
}

impl UnknownPermissionPolicy {
    /// Parses a configuration value (`ignore` or `reject`).
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(AppError::Validation(format!(
                "unknown permission policy must be 'ignore' or 'reject', got '{other}'"
            ))),
        }
    }
}

/// Application service for role and permission administration.
#[derive(Clone)]
pub struct RoleRegistryService {
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
    unknown_permissions: UnknownPermissionPolicy,
}

impl RoleRegistryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
        unknown_permissions: UnknownPermissionPolicy,
    ) -> Self {
        Self {
            role_repository,
            permission_repository,
            unknown_permissions,
        }
    }

    /// Trims and de-duplicates requested names, then applies the unknown
    /// permission policy against the current store contents.
    async fn resolve_permission_names(
        &self,
        role_name: &str,
        requested: Vec<String>,
    ) -> AppResult<Vec<String>> {
        let requested = requested
            .into_iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        if requested.is_empty() {
            return Ok(requested);
        }

        let resolved = self
            .permission_repository
            .find_permissions_by_names(&requested)
            .await?
            .into_iter()
            .map(|permission| permission.name().to_owned())
            .collect::<BTreeSet<_>>();

        let unresolved = requested
            .iter()
            .filter(|name| !resolved.contains(*name))
            .map(String::as_str)
            .collect::<Vec<_>>();

        if unresolved.is_empty() {
            return Ok(requested);
        }

        match self.unknown_permissions {
            UnknownPermissionPolicy::Reject => Err(AppError::NotFound(format!(
                "permissions not found for role '{role_name}': {}",
                unresolved.join(", ")
            ))),
            UnknownPermissionPolicy::Ignore => {
                warn!(
                    role_name,
                    unresolved = %unresolved.join(","),
                    "ignoring unresolved permission names"
                );
                Ok(resolved.into_iter().collect())
            }
        }
    }
}

fn normalize_name(name: String) -> AppResult<String> {
    NonEmptyString::new(name).map(String::from)
}
