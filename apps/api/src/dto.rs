mod conversions;
mod types;

pub use types::{
    AccessCheckQuery, AccessCheckResponse, AuthorizationSubjectResponse, CreatePermissionRequest,
    CreateRoleRequest, HealthResponse, PageQuery, PermissionResponse, RegisterSubjectRequest,
    RoleAssignmentResponse, RoleResponse, SubjectResponse, UpdatePermissionRequest,
    UpdateRoleRequest, UpdateSuperuserRequest,
};
