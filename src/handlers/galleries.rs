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
    models::{GalleryForm, GalleryResponse},
    pagination::{ListQuery, Page},
    services::galleries,
    uploads::{FormMode, MultipartForm},
};

#[utoipa::path(
    get,
    path = "/api/galleries",
    params(ListQuery),
    tag = "galleries",
    responses((status = 200, description = "Gallery items, newest first", body = Page<GalleryResponse>))
)]
pub async fn list_galleries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<GalleryResponse>>> {
    Ok(Json(galleries::list(&state, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/galleries/{id}",
    params(("id" = Uuid, Path, description = "Gallery ID")),
    tag = "galleries",
    responses((status = 200, description = "Gallery item", body = GalleryResponse))
)]
pub async fn get_gallery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GalleryResponse>> {
    Ok(Json(galleries::get(&state, id).await?))
}

/// create_gallery
///
/// [Authenticated Route] `image` is mandatory.
#[utoipa::path(
    post,
    path = "/api/galleries",
    request_body(content = GalleryForm, content_type = "multipart/form-data"),
    tag = "galleries",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = GalleryResponse),
        (status = 413, description = "Image too large"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_gallery(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<GalleryResponse>)> {
    user.require("galleries.create")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = GalleryForm::from_form(form, FormMode::Create)?;
    let created = galleries::create(&state, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/galleries/{id}",
    params(("id" = Uuid, Path, description = "Gallery ID")),
    request_body(content = GalleryForm, content_type = "multipart/form-data"),
    tag = "galleries",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = GalleryResponse))
)]
pub async fn update_gallery(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<GalleryResponse>> {
    user.require("galleries.update")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = GalleryForm::from_form(form, FormMode::Update)?;
    Ok(Json(galleries::update(&state, id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/galleries/{id}",
    params(("id" = Uuid, Path, description = "Gallery ID")),
    tag = "galleries",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_gallery(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("galleries.delete")?;
    galleries::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
