use rolegate_application::{
    CreatePermissionInput, CreateRoleInput, RegisterSubjectInput, RoleAssignment,
    UpdateRoleInput,
};
use rolegate_core::{AppError, AppResult, PageRequest};
use rolegate_domain::{AccessRequirement, AuthorizationSubject, Permission, Role, Subject};

use super::types::{
    AccessCheckQuery, AuthorizationSubjectResponse, CreatePermissionRequest, CreateRoleRequest,
    PageQuery, PermissionResponse, RegisterSubjectRequest, RoleAssignmentResponse, RoleResponse,
    SubjectResponse, UpdateRoleRequest,
};

impl PageQuery {
    pub fn to_page_request(&self) -> AppResult<PageRequest> {
        PageRequest::new(
            self.offset.unwrap_or(0),
            self.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

impl AccessCheckQuery {
    /// Exactly one of `permission` or `role` must be given.
    pub fn to_requirement(&self) -> AppResult<AccessRequirement> {
        match (self.permission.as_deref(), self.role.as_deref()) {
            (Some(permission), None) => Ok(AccessRequirement::permission(permission)),
            (None, Some(role)) => Ok(AccessRequirement::role(role)),
            _ => Err(AppError::Validation(
                "exactly one of 'permission' or 'role' must be provided".to_owned(),
            )),
        }
    }
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.id(),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            guard_name: value.guard_name().to_owned(),
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id(),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            guard_name: value.guard_name().to_owned(),
            permissions: value
                .permissions()
                .iter()
                .cloned()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

impl From<Subject> for SubjectResponse {
    fn from(value: Subject) -> Self {
        Self {
            subject_id: value.id(),
            email: value.email().as_str().to_owned(),
            display_name: value.display_name().map(str::to_owned),
            is_active: value.is_active(),
            is_superuser: value.is_superuser(),
        }
    }
}

impl From<AuthorizationSubject> for AuthorizationSubjectResponse {
    fn from(value: AuthorizationSubject) -> Self {
        Self {
            permissions: value
                .permission_names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            subject: SubjectResponse::from(value.subject().clone()),
            roles: value
                .roles()
                .iter()
                .cloned()
                .map(RoleResponse::from)
                .collect(),
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            subject_id: value.subject_id,
            email: value.email,
            assigned_at: value.assigned_at,
        }
    }
}

impl From<CreateRoleRequest> for CreateRoleInput {
    fn from(value: CreateRoleRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            guard_name: value.guard_name,
            permission_names: value.permissions,
        }
    }
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(value: UpdateRoleRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            permission_names: value.permissions,
        }
    }
}

impl From<CreatePermissionRequest> for CreatePermissionInput {
    fn from(value: CreatePermissionRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            guard_name: value.guard_name,
        }
    }
}

impl From<RegisterSubjectRequest> for RegisterSubjectInput {
    fn from(value: RegisterSubjectRequest) -> Self {
        Self {
            email: value.email,
            display_name: value.display_name,
            is_active: value.is_active,
            is_superuser: false,
        }
    }
}
