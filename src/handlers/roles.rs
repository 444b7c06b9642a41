use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{CreateRoleRequest, Role, RoleDetail, SyncPermissionsRequest, UpdateRoleRequest},
    services::roles,
};

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "roles",
    security(("bearer" = [])),
    responses((status = 200, description = "Roles by name", body = [Role]))
)]
pub async fn list_roles(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Role>>> {
    user.require("roles.view")?;
    Ok(Json(roles::list(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    tag = "roles",
    security(("bearer" = [])),
    responses((status = 200, description = "Role with its permissions", body = RoleDetail))
)]
pub async fn get_role(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleDetail>> {
    user.require("roles.view")?;
    Ok(Json(roles::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleRequest,
    tag = "roles",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = RoleDetail),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_role(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<RoleDetail>)> {
    user.require("roles.create")?;
    let created = roles::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    tag = "roles",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = RoleDetail))
)]
pub async fn update_role(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<RoleDetail>> {
    user.require("roles.update")?;
    Ok(Json(roles::update(&state, id, payload).await?))
}

/// sync_role_permissions
///
/// [Authenticated Route] Replaces the role's permission set with exactly the given ids.
#[utoipa::path(
    put,
    path = "/api/roles/{id}/permissions",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = SyncPermissionsRequest,
    tag = "roles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Synced", body = RoleDetail),
        (status = 422, description = "Unknown permission id")
    )
)]
pub async fn sync_role_permissions(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SyncPermissionsRequest>,
) -> AppResult<Json<RoleDetail>> {
    user.require("roles.update")?;
    Ok(Json(
        roles::sync_permissions(&state, id, &payload.permission_ids).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    tag = "roles",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 409, description = "Role still assigned to users")
    )
)]
pub async fn delete_role(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("roles.delete")?;
    roles::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
