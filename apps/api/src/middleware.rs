use axum::Extension;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use rolegate_domain::AccessRequirement;

use crate::auth::CurrentSubject;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn resolve_subject(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let subject_id = state.authenticator.authenticate(request.headers()).await?;

    request.extensions_mut().insert(CurrentSubject(subject_id));
    Ok(next.run(request).await)
}

/// Enforces the [`AccessRequirement`] attached to the route and exposes the
/// authorized subject to handlers.
pub async fn require_access(
    State(state): State<AppState>,
    Extension(requirement): Extension<AccessRequirement>,
    Extension(current): Extension<CurrentSubject>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let subject = state
        .authorization_service
        .authorize(current.0, &requirement)
        .await?;

    request.extensions_mut().insert(subject);
    Ok(next.run(request).await)
}
