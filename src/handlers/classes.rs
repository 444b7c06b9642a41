use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{SchoolClassForm, SchoolClassResponse},
    pagination::{ListQuery, Page},
    services::classes,
    uploads::{FormMode, MultipartForm},
};

/// list_classes
///
/// [Public Route] Ordered by grade level, then name.
#[utoipa::path(
    get,
    path = "/api/classes",
    params(ListQuery),
    tag = "classes",
    responses((status = 200, description = "Classes", body = Page<SchoolClassResponse>))
)]
pub async fn list_classes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<SchoolClassResponse>>> {
    Ok(Json(classes::list(&state, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    tag = "classes",
    responses((status = 200, description = "Class", body = SchoolClassResponse))
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SchoolClassResponse>> {
    Ok(Json(classes::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body(content = SchoolClassForm, content_type = "multipart/form-data"),
    tag = "classes",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = SchoolClassResponse),
        (status = 409, description = "Name taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_class(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<SchoolClassResponse>)> {
    user.require("classes.create")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = SchoolClassForm::from_form(form, FormMode::Create)?;
    let created = classes::create(&state, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body(content = SchoolClassForm, content_type = "multipart/form-data"),
    tag = "classes",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = SchoolClassResponse))
)]
pub async fn update_class(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<SchoolClassResponse>> {
    user.require("classes.update")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = SchoolClassForm::from_form(form, FormMode::Update)?;
    Ok(Json(classes::update(&state, id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    tag = "classes",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_class(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("classes.delete")?;
    classes::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
