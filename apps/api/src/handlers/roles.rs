use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_registry_service
        .list_roles(query.to_page_request()?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_registry_service
        .create_role(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.role_registry_service.get_role(role_id).await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn get_role_by_name_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_registry_service
        .get_role_by_name(name.as_str())
        .await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_registry_service
        .update_role(role_id, payload.into())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<StatusCode> {
    state.role_registry_service.delete_role(role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_subjects_handler(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let assignments = state
        .role_registry_service
        .list_role_assignments(role_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
