use rolegate_core::{PageRequest, PermissionId};
use rolegate_domain::Permission;
use tracing::info;

use super::*;

use crate::rbac_ports::CreatePermissionInput;

impl RoleRegistryService {
    /// Creates a permission with a globally unique name.
    pub async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let name = normalize_name(input.name)?;

        if self
            .permission_repository
            .find_permission_by_name(name.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let permission = self
            .permission_repository
            .create_permission(CreatePermissionInput {
                name,
                description: input.description,
                guard_name: input.guard_name,
            })
            .await?;

        info!(
            permission_id = %permission.id(),
            permission_name = permission.name(),
            "permission created"
        );
        Ok(permission)
    }

    /// Lists a page of permissions in id order.
    pub async fn list_permissions(&self, page: PageRequest) -> AppResult<Vec<Permission>> {
        self.permission_repository.list_permissions(page).await
    }

    /// Returns a permission by id.
    pub async fn get_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.permission_repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    /// Replaces a permission's description, the only mutable attribute.
    pub async fn update_permission_description(
        &self,
        permission_id: PermissionId,
        description: Option<String>,
    ) -> AppResult<Permission> {
        self.permission_repository
            .update_permission_description(permission_id, description)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    /// Deletes a permission and detaches it from every role.
    pub async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        if !self
            .permission_repository
            .delete_permission(permission_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        info!(permission_id = %permission_id, "permission deleted");
        Ok(())
    }
}
