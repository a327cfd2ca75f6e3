use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_registry_service
        .list_permissions(query.to_page_request()?)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .role_registry_service
        .create_permission(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<PermissionId>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .role_registry_service
        .get_permission(permission_id)
        .await?;
    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<PermissionId>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .role_registry_service
        .update_permission_description(permission_id, payload.description)
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<PermissionId>,
) -> ApiResult<StatusCode> {
    state
        .role_registry_service
        .delete_permission(permission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
