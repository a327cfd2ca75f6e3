use rolegate_core::{PageRequest, RoleId};
use rolegate_domain::Role;
use tracing::info;

use super::*;

use crate::rbac_ports::{CreateRoleInput, RoleAssignment, UpdateRoleInput};

impl RoleRegistryService {
    /// Creates a role and links the requested permissions in one transaction.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let name = normalize_name(input.name)?;

        if self
            .role_repository
            .find_role_by_name(name.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        let permission_names = self
            .resolve_permission_names(name.as_str(), input.permission_names)
            .await?;

        let role = self
            .role_repository
            .create_role(CreateRoleInput {
                name,
                description: input.description,
                guard_name: input.guard_name,
                permission_names,
            })
            .await?;

        info!(
            role_id = %role.id(),
            role_name = role.name(),
            permissions = role.permissions().len(),
            "role created"
        );
        Ok(role)
    }

    /// Overwrites a role's name and optionally its description and permission set.
    ///
    /// A provided permission list replaces the stored set; it is never merged.
    pub async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let name = normalize_name(input.name)?;

        let permission_names = match input.permission_names {
            Some(requested) => Some(
                self.resolve_permission_names(name.as_str(), requested)
                    .await?,
            ),
            None => None,
        };

        let role = self
            .role_repository
            .update_role(
                role_id,
                UpdateRoleInput {
                    name,
                    description: input.description,
                    permission_names,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        info!(role_id = %role.id(), role_name = role.name(), "role updated");
        Ok(role)
    }

    /// Deletes a role and detaches it from every subject and permission.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        if !self.role_repository.delete_role(role_id).await? {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    /// Lists a page of roles in id order.
    pub async fn list_roles(&self, page: PageRequest) -> AppResult<Vec<Role>> {
        self.role_repository.list_roles(page).await
    }

    /// Returns a role by id.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Returns a role by exact name.
    pub async fn get_role_by_name(&self, name: &str) -> AppResult<Role> {
        self.role_repository
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))
    }

    /// Lists subjects currently holding a role.
    pub async fn list_role_assignments(&self, role_id: RoleId) -> AppResult<Vec<RoleAssignment>> {
        self.get_role(role_id).await?;
        self.role_repository.list_role_assignments(role_id).await
    }
}
