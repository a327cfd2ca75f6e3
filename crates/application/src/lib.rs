//! Application services and ports.

#![forbid(unsafe_code)]

mod assignment_service;
mod authorization_service;
mod rbac_ports;
mod role_registry_service;
mod subject_service;

#[cfg(test)]
mod test_support;

pub use assignment_service::AssignmentService;
pub use authorization_service::AuthorizationService;
pub use rbac_ports::{
    CreatePermissionInput, CreateRoleInput, NewSubject, PermissionRepository,
    RegisterSubjectInput, RoleAssignment, RoleRepository, SubjectRepository, UpdateRoleInput,
};
pub use role_registry_service::{RoleRegistryService, UnknownPermissionPolicy};
pub use subject_service::SubjectService;
