//! Idempotent baseline data for a fresh store.

use std::collections::BTreeSet;

use rolegate_application::{
    CreatePermissionInput, CreateRoleInput, RegisterSubjectInput, UpdateRoleInput,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Role, Subject};
use tracing::info;

use crate::api_router::{
    ADMIN_ROLE, USERS_DELETE_PERMISSION, USERS_EDIT_PERMISSION, USERS_VIEW_PERMISSION,
};
use crate::state::AppState;

const BASELINE_PERMISSIONS: [(&str, &str); 3] = [
    (USERS_VIEW_PERMISSION, "View users"),
    (USERS_EDIT_PERMISSION, "Edit users"),
    (USERS_DELETE_PERMISSION, "Delete users"),
];

/// Creates the baseline permissions and the `admin` role carrying all of
/// them. When `superuser_email` is set, that subject is registered (or
/// reused), flagged as superuser and assigned `admin`.
///
/// Running it again leaves existing rows in place.
pub async fn run(state: &AppState, superuser_email: Option<&str>) -> AppResult<()> {
    for (name, description) in BASELINE_PERMISSIONS {
        let created = state
            .role_registry_service
            .create_permission(CreatePermissionInput {
                name: name.to_owned(),
                description: Some(description.to_owned()),
                guard_name: None,
            })
            .await;

        match created {
            Ok(permission) => info!(permission = permission.name(), "seeded permission"),
            Err(AppError::Conflict(_)) => {}
            Err(error) => return Err(error),
        }
    }

    let admin_role = ensure_admin_role(state).await?;

    if let Some(email) = superuser_email {
        let subject = ensure_superuser(state, email).await?;
        state
            .assignment_service
            .assign_role(subject.id(), admin_role.id())
            .await?;
        info!(email = subject.email().as_str(), "seeded superuser");
    }

    Ok(())
}

async fn ensure_admin_role(state: &AppState) -> AppResult<Role> {
    let baseline = BASELINE_PERMISSIONS
        .iter()
        .map(|(name, _)| (*name).to_owned())
        .collect::<Vec<_>>();

    match state.role_registry_service.get_role_by_name(ADMIN_ROLE).await {
        Ok(role) => {
            let mut permission_names = role
                .permissions()
                .iter()
                .map(|permission| permission.name().to_owned())
                .collect::<BTreeSet<_>>();
            if baseline.iter().all(|name| permission_names.contains(name)) {
                return Ok(role);
            }

            permission_names.extend(baseline);
            let role = state
                .role_registry_service
                .update_role(
                    role.id(),
                    UpdateRoleInput {
                        name: role.name().to_owned(),
                        description: None,
                        permission_names: Some(permission_names.into_iter().collect()),
                    },
                )
                .await?;
            info!(role = role.name(), "extended admin role with baseline permissions");
            Ok(role)
        }
        Err(AppError::NotFound(_)) => {
            let role = state
                .role_registry_service
                .create_role(CreateRoleInput {
                    name: ADMIN_ROLE.to_owned(),
                    description: Some("Administrator".to_owned()),
                    guard_name: None,
                    permission_names: baseline,
                })
                .await?;
            info!(role = role.name(), "seeded admin role");
            Ok(role)
        }
        Err(error) => Err(error),
    }
}

async fn ensure_superuser(state: &AppState, email: &str) -> AppResult<Subject> {
    let registered = state
        .subject_service
        .register_subject(RegisterSubjectInput {
            email: email.to_owned(),
            display_name: None,
            is_active: true,
            is_superuser: true,
        })
        .await;

    match registered {
        Ok(subject) => Ok(subject),
        Err(AppError::Conflict(_)) => {
            let subject = state.subject_service.get_subject_by_email(email).await?;
            if subject.is_superuser() {
                return Ok(subject);
            }
            state
                .subject_service
                .set_superuser(subject.id(), true)
                .await
        }
        Err(error) => Err(error),
    }
}
