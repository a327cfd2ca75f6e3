use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, patch, post, put};
use axum::{Extension, Router};
use rolegate_core::AppError;
use rolegate_domain::AccessRequirement;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::SUBJECT_ID_HEADER;
use crate::state::AppState;
use crate::{handlers, middleware};

#[cfg(test)]
mod tests;

pub const USERS_VIEW_PERMISSION: &str = "users.view";
pub const USERS_EDIT_PERMISSION: &str = "users.edit";
pub const USERS_DELETE_PERMISSION: &str = "users.delete";
pub const ADMIN_ROLE: &str = "admin";

pub fn build_router(
    app_state: AppState,
    cors_allowed_origin: Option<&str>,
) -> Result<Router, AppError> {
    let view = AccessRequirement::permission(USERS_VIEW_PERMISSION);
    let edit = AccessRequirement::permission(USERS_EDIT_PERMISSION);
    let remove = AccessRequirement::permission(USERS_DELETE_PERMISSION);
    let admin = AccessRequirement::role(ADMIN_ROLE);
    let guard = |method_router: MethodRouter<AppState>, requirement: &AccessRequirement| {
        guarded(method_router, &app_state, requirement)
    };

    let api_routes = Router::new()
        .route("/api/me", get(handlers::me_handler))
        .route(
            "/api/roles",
            guard(get(handlers::list_roles_handler), &view)
                .merge(guard(post(handlers::create_role_handler), &edit)),
        )
        .route(
            "/api/roles/by-name/{name}",
            guard(get(handlers::get_role_by_name_handler), &view),
        )
        .route(
            "/api/roles/{role_id}",
            guard(get(handlers::get_role_handler), &view)
                .merge(guard(put(handlers::update_role_handler), &edit))
                .merge(guard(delete(handlers::delete_role_handler), &remove)),
        )
        .route(
            "/api/roles/{role_id}/subjects",
            guard(get(handlers::list_role_subjects_handler), &view),
        )
        .route(
            "/api/permissions",
            guard(get(handlers::list_permissions_handler), &view)
                .merge(guard(post(handlers::create_permission_handler), &edit)),
        )
        .route(
            "/api/permissions/{permission_id}",
            guard(get(handlers::get_permission_handler), &view)
                .merge(guard(patch(handlers::update_permission_handler), &edit))
                .merge(guard(delete(handlers::delete_permission_handler), &remove)),
        )
        .route(
            "/api/subjects",
            guard(get(handlers::list_subjects_handler), &view)
                .merge(guard(post(handlers::register_subject_handler), &edit)),
        )
        .route(
            "/api/subjects/{subject_id}",
            guard(get(handlers::get_subject_handler), &view),
        )
        .route(
            "/api/subjects/{subject_id}/superuser",
            guard(put(handlers::update_superuser_handler), &admin),
        )
        .route(
            "/api/subjects/{subject_id}/roles/{role_id}",
            guard(post(handlers::assign_role_handler), &edit)
                .merge(guard(delete(handlers::remove_role_handler), &edit)),
        )
        .route(
            "/api/subjects/{subject_id}/access",
            guard(get(handlers::check_access_handler), &view),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_subject,
        ));

    let mut app = Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_allowed_origin {
        app = app.layer(cors_layer(origin)?);
    }

    Ok(app.with_state(app_state))
}

/// Attaches a requirement to one method route. The route runs only when the
/// resolved subject satisfies it.
fn guarded(
    method_router: MethodRouter<AppState>,
    app_state: &AppState,
    requirement: &AccessRequirement,
) -> MethodRouter<AppState> {
    method_router
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_access,
        ))
        .layer(Extension(requirement.clone()))
}

fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin).map_err(|error| {
            AppError::Validation(format!("invalid CORS_ALLOWED_ORIGIN: {error}"))
        })?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SUBJECT_ID_HEADER)]))
}
