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
    models::{ExtracurricularForm, ExtracurricularResponse},
    pagination::{ListQuery, Page},
    services::extracurriculars,
    uploads::{FormMode, MultipartForm},
};

#[utoipa::path(
    get,
    path = "/api/extracurriculars",
    params(ListQuery),
    tag = "extracurriculars",
    responses((status = 200, description = "Extracurriculars by name", body = Page<ExtracurricularResponse>))
)]
pub async fn list_extracurriculars(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<ExtracurricularResponse>>> {
    Ok(Json(extracurriculars::list(&state, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/extracurriculars/{id}",
    params(("id" = Uuid, Path, description = "Extracurricular ID")),
    tag = "extracurriculars",
    responses((status = 200, description = "Extracurricular", body = ExtracurricularResponse))
)]
pub async fn get_extracurricular(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExtracurricularResponse>> {
    Ok(Json(extracurriculars::get(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/extracurriculars",
    request_body(content = ExtracurricularForm, content_type = "multipart/form-data"),
    tag = "extracurriculars",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = ExtracurricularResponse),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_extracurricular(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ExtracurricularResponse>)> {
    user.require("extracurriculars.create")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = ExtracurricularForm::from_form(form, FormMode::Create)?;
    let created = extracurriculars::create(&state, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/extracurriculars/{id}",
    params(("id" = Uuid, Path, description = "Extracurricular ID")),
    request_body(content = ExtracurricularForm, content_type = "multipart/form-data"),
    tag = "extracurriculars",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = ExtracurricularResponse))
)]
pub async fn update_extracurricular(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ExtracurricularResponse>> {
    user.require("extracurriculars.update")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = ExtracurricularForm::from_form(form, FormMode::Update)?;
    Ok(Json(extracurriculars::update(&state, id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/extracurriculars/{id}",
    params(("id" = Uuid, Path, description = "Extracurricular ID")),
    tag = "extracurriculars",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_extracurricular(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("extracurriculars.delete")?;
    extracurriculars::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
