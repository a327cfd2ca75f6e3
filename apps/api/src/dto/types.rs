use rolegate_core::{PermissionId, RoleId, SubjectId};
use rolegate_domain::{AccessDecision, AccessRequirement};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

/// Offset paging query for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission_id: PermissionId,
    pub name: String,
    pub description: Option<String>,
    pub guard_name: String,
}

/// API representation of a role with its permissions.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub guard_name: String,
    pub permissions: Vec<PermissionResponse>,
}

/// API representation of a subject.
#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    pub subject_id: SubjectId,
    pub email: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Subject with its roles and the distinct permission names they grant.
#[derive(Debug, Serialize)]
pub struct AuthorizationSubjectResponse {
    #[serde(flatten)]
    pub subject: SubjectResponse,
    pub roles: Vec<RoleResponse>,
    pub permissions: Vec<String>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize)]
pub struct RoleAssignmentResponse {
    pub subject_id: SubjectId,
    pub email: String,
    pub assigned_at: String,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub guard_name: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload for role updates. An omitted `permissions` list keeps the
/// current set.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
    pub guard_name: Option<String>,
}

/// Incoming payload for permission description updates.
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub description: Option<String>,
}

/// Incoming payload for subject registration.
#[derive(Debug, Deserialize)]
pub struct RegisterSubjectRequest {
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Incoming payload for superuser flag updates.
#[derive(Debug, Deserialize)]
pub struct UpdateSuperuserRequest {
    pub is_superuser: bool,
}

/// Query selecting what to check on the access endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AccessCheckQuery {
    pub permission: Option<String>,
    pub role: Option<String>,
}

/// Result of an access check for one subject.
#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub subject_id: SubjectId,
    pub requirement: AccessRequirement,
    pub decision: AccessDecision,
    pub allowed: bool,
}
