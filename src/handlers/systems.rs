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
    models::{System, SystemRequest, UpdateSystemRequest},
    services::systems,
};

#[utoipa::path(
    get,
    path = "/api/systems",
    tag = "systems",
    security(("bearer" = [])),
    responses((status = 200, description = "Systems by name", body = [System]))
)]
pub async fn list_systems(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<System>>> {
    user.require("systems.view")?;
    Ok(Json(systems::list(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/systems/{id}",
    params(("id" = Uuid, Path, description = "System ID")),
    tag = "systems",
    security(("bearer" = [])),
    responses((status = 200, description = "System", body = System))
)]
pub async fn get_system(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<System>> {
    user.require("systems.view")?;
    Ok(Json(systems::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/systems",
    request_body = SystemRequest,
    tag = "systems",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = System),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_system(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SystemRequest>,
) -> AppResult<(StatusCode, Json<System>)> {
    user.require("systems.create")?;
    let created = systems::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/systems/{id}",
    params(("id" = Uuid, Path, description = "System ID")),
    request_body = UpdateSystemRequest,
    tag = "systems",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = System))
)]
pub async fn update_system(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSystemRequest>,
) -> AppResult<Json<System>> {
    user.require("systems.update")?;
    Ok(Json(systems::update(&state, id, payload).await?))
}

/// delete_system
///
/// [Authenticated Route] Refused with 409 while permissions still belong to the system.
#[utoipa::path(
    delete,
    path = "/api/systems/{id}",
    params(("id" = Uuid, Path, description = "System ID")),
    tag = "systems",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 409, description = "System still owns permissions")
    )
)]
pub async fn delete_system(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("systems.delete")?;
    systems::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
