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
    models::{CreateUserRequest, UpdateUserRequest, UserResponse},
    pagination::{ListQuery, Page},
    services::users,
};

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListQuery),
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "Users by name", body = Page<UserResponse>))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<UserResponse>>> {
    user.require("users.view")?;
    Ok(Json(users::list(&state, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "User", body = UserResponse))
)]
pub async fn get_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    user.require("users.view")?;
    Ok(Json(users::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 409, description = "Email taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    user.require("users.create")?;
    let created = users::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = UserResponse))
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    user.require("users.update")?;
    Ok(Json(users::update(&state, id, payload).await?))
}

/// delete_user
///
/// [Authenticated Route] Callers cannot delete their own account (409).
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 409, description = "Attempted self-deletion")
    )
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("users.delete")?;
    users::delete(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
