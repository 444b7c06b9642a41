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
    models::{AnnouncementForm, AnnouncementResponse},
    pagination::{ListQuery, Page},
    services::announcements,
    uploads::{FormMode, MultipartForm},
};

const GROUP: &str = "announcements";

/// list_announcements
///
/// [Public Route] Published announcements, newest first.
#[utoipa::path(
    get,
    path = "/api/announcements",
    params(ListQuery),
    tag = "announcements",
    responses((status = 200, description = "Published announcements", body = Page<AnnouncementResponse>))
)]
pub async fn list_announcements(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<AnnouncementResponse>>> {
    Ok(Json(announcements::list(&state, &query, true).await?))
}

/// get_announcement
///
/// [Public Route] Drafts answer 404.
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    tag = "announcements",
    responses(
        (status = 200, description = "Announcement", body = AnnouncementResponse),
        (status = 404, description = "Not found or not published")
    )
)]
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AnnouncementResponse>> {
    Ok(Json(announcements::get(&state, id, true).await?))
}

/// list_admin_announcements
///
/// [Authenticated Route] Every announcement including drafts. Any permission in the
/// `announcements` group grants access.
#[utoipa::path(
    get,
    path = "/api/admin/announcements",
    params(ListQuery),
    tag = "announcements",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All announcements", body = Page<AnnouncementResponse>),
        (status = 403, description = "No announcements permission")
    )
)]
pub async fn list_admin_announcements(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<AnnouncementResponse>>> {
    user.require_group(GROUP)?;
    Ok(Json(announcements::list(&state, &query, false).await?))
}

/// get_admin_announcement
///
/// [Authenticated Route] A single announcement, drafts included.
#[utoipa::path(
    get,
    path = "/api/admin/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    tag = "announcements",
    security(("bearer" = [])),
    responses((status = 200, description = "Announcement", body = AnnouncementResponse))
)]
pub async fn get_admin_announcement(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AnnouncementResponse>> {
    user.require_group(GROUP)?;
    Ok(Json(announcements::get(&state, id, false).await?))
}

/// create_announcement
///
/// [Authenticated Route] Multipart form; the caller becomes the author.
#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body(content = AnnouncementForm, content_type = "multipart/form-data"),
    tag = "announcements",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = AnnouncementResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_announcement(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<AnnouncementResponse>)> {
    user.require("announcements.create")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = AnnouncementForm::from_form(form, FormMode::Create)?;
    let created = announcements::create(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_announcement
///
/// [Authenticated Route] Partial multipart update. A new `image` replaces the old one.
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body(content = AnnouncementForm, content_type = "multipart/form-data"),
    tag = "announcements",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = AnnouncementResponse))
)]
pub async fn update_announcement(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<AnnouncementResponse>> {
    user.require("announcements.update")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = AnnouncementForm::from_form(form, FormMode::Update)?;
    Ok(Json(announcements::update(&state, id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    tag = "announcements",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_announcement(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("announcements.delete")?;
    announcements::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
