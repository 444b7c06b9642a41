use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{CreatePermissionRequest, Permission, PermissionFilter, UpdatePermissionRequest},
    services::permissions,
};

#[utoipa::path(
    get,
    path = "/api/permissions",
    params(PermissionFilter),
    tag = "permissions",
    security(("bearer" = [])),
    responses((status = 200, description = "Permissions by group and name", body = [Permission]))
)]
pub async fn list_permissions(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PermissionFilter>,
) -> AppResult<Json<Vec<Permission>>> {
    user.require("permissions.view")?;
    Ok(Json(permissions::list(&state, filter.system_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission ID")),
    tag = "permissions",
    security(("bearer" = [])),
    responses((status = 200, description = "Permission", body = Permission))
)]
pub async fn get_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Permission>> {
    user.require("permissions.view")?;
    Ok(Json(permissions::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionRequest,
    tag = "permissions",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = Permission),
        (status = 409, description = "Name taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> AppResult<(StatusCode, Json<Permission>)> {
    user.require("permissions.create")?;
    let created = permissions::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission ID")),
    request_body = UpdatePermissionRequest,
    tag = "permissions",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = Permission))
)]
pub async fn update_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> AppResult<Json<Permission>> {
    user.require("permissions.update")?;
    Ok(Json(permissions::update(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission ID")),
    tag = "permissions",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("permissions.delete")?;
    permissions::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
