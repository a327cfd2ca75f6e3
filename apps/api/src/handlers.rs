use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use rolegate_core::{PermissionId, RoleId, SubjectId};

use crate::auth::CurrentSubject;
use crate::dto::{
    AccessCheckQuery, AccessCheckResponse, AuthorizationSubjectResponse, CreatePermissionRequest,
    CreateRoleRequest, HealthResponse, PageQuery, PermissionResponse, RegisterSubjectRequest,
    RoleAssignmentResponse, RoleResponse, SubjectResponse, UpdatePermissionRequest,
    UpdateRoleRequest, UpdateSuperuserRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod health;
mod me;
mod permissions;
mod roles;
mod subjects;


pub use health::health_handler;
pub use me::me_handler;
pub use permissions::{
    create_permission_handler, delete_permission_handler, get_permission_handler,
    list_permissions_handler, update_permission_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, get_role_by_name_handler, get_role_handler,
    list_role_subjects_handler, list_roles_handler, update_role_handler,
};
pub use subjects::{
    assign_role_handler, check_access_handler, get_subject_handler, list_subjects_handler,
    register_subject_handler, remove_role_handler, update_superuser_handler,
};
