use super::*;

pub async fn list_subjects_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<SubjectResponse>>> {
    let subjects = state
        .subject_service
        .list_subjects(query.to_page_request()?)
        .await?
        .into_iter()
        .map(SubjectResponse::from)
        .collect();

    Ok(Json(subjects))
}

pub async fn register_subject_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSubjectRequest>,
) -> ApiResult<(StatusCode, Json<SubjectResponse>)> {
    let subject = state
        .subject_service
        .register_subject(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from(subject))))
}

pub async fn get_subject_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> ApiResult<Json<AuthorizationSubjectResponse>> {
    let subject = state.subject_service.get_subject(subject_id).await?;
    Ok(Json(AuthorizationSubjectResponse::from(subject)))
}

pub async fn update_superuser_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Json(payload): Json<UpdateSuperuserRequest>,
) -> ApiResult<Json<SubjectResponse>> {
    let subject = state
        .subject_service
        .set_superuser(subject_id, payload.is_superuser)
        .await?;

    Ok(Json(SubjectResponse::from(subject)))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Path((subject_id, role_id)): Path<(SubjectId, RoleId)>,
) -> ApiResult<Json<AuthorizationSubjectResponse>> {
    let subject = state
        .assignment_service
        .assign_role(subject_id, role_id)
        .await?;

    Ok(Json(AuthorizationSubjectResponse::from(subject)))
}

pub async fn remove_role_handler(
    State(state): State<AppState>,
    Path((subject_id, role_id)): Path<(SubjectId, RoleId)>,
) -> ApiResult<Json<AuthorizationSubjectResponse>> {
    let subject = state
        .assignment_service
        .remove_role(subject_id, role_id)
        .await?;

    Ok(Json(AuthorizationSubjectResponse::from(subject)))
}

pub async fn check_access_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Query(query): Query<AccessCheckQuery>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let requirement = query.to_requirement()?;
    let decision = state
        .authorization_service
        .evaluate_subject_access(subject_id, &requirement)
        .await?;

    Ok(Json(AccessCheckResponse {
        subject_id,
        requirement,
        decision,
        allowed: decision.is_allowed(),
    }))
}
