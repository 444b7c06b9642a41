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
    models::{ArticleFilter, ArticleForm, ArticleResponse},
    pagination::Page,
    services::articles,
    uploads::{FormMode, MultipartForm},
};

const GROUP: &str = "articles";

/// list_articles
///
/// [Public Route] Published articles, newest first, optionally narrowed by `category`
/// and `search`.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleFilter),
    tag = "articles",
    responses((status = 200, description = "Published articles", body = Page<ArticleResponse>))
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> AppResult<Json<Page<ArticleResponse>>> {
    Ok(Json(articles::list(&state, &filter, true).await?))
}

#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    tag = "articles",
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Not found or not published")
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ArticleResponse>> {
    Ok(Json(articles::get(&state, id, true).await?))
}

#[utoipa::path(
    get,
    path = "/api/articles/slug/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    tag = "articles",
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Not found or not published")
    )
)]
pub async fn get_article_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ArticleResponse>> {
    Ok(Json(articles::get_by_slug(&state, &slug, true).await?))
}

/// list_admin_articles
///
/// [Authenticated Route] Every article including drafts.
#[utoipa::path(
    get,
    path = "/api/admin/articles",
    params(ArticleFilter),
    tag = "articles",
    security(("bearer" = [])),
    responses((status = 200, description = "All articles", body = Page<ArticleResponse>))
)]
pub async fn list_admin_articles(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> AppResult<Json<Page<ArticleResponse>>> {
    user.require_group(GROUP)?;
    Ok(Json(articles::list(&state, &filter, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    tag = "articles",
    security(("bearer" = [])),
    responses((status = 200, description = "Article", body = ArticleResponse))
)]
pub async fn get_admin_article(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ArticleResponse>> {
    user.require_group(GROUP)?;
    Ok(Json(articles::get(&state, id, false).await?))
}

/// create_article
///
/// [Authenticated Route] Multipart form. Without `slug`, one is derived from the title.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    tag = "articles",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = ArticleResponse),
        (status = 409, description = "Slug taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_article(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ArticleResponse>)> {
    user.require("articles.create")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = ArticleForm::from_form(form, FormMode::Create)?;
    let created = articles::create(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    tag = "articles",
    security(("bearer" = [])),
    responses((status = 200, description = "Updated", body = ArticleResponse))
)]
pub async fn update_article(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ArticleResponse>> {
    user.require("articles.update")?;
    let form = MultipartForm::from_multipart(multipart, state.config.max_upload_bytes).await?;
    let form = ArticleForm::from_form(form, FormMode::Update)?;
    Ok(Json(articles::update(&state, id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    tag = "articles",
    security(("bearer" = [])),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_article(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require("articles.delete")?;
    articles::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
