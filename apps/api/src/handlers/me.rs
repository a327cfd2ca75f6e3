use rolegate_core::AppError;

use super::*;

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSubject>,
) -> ApiResult<Json<AuthorizationSubjectResponse>> {
    let subject = state
        .authorization_service
        .current_subject(current.0)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(AuthorizationSubjectResponse::from(subject)))
}
