use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. Announcement and article handlers only ever
/// return published rows here; drafts answer 404.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /api/auth/login
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/announcements",
            get(handlers::announcements::list_announcements),
        )
        .route(
            "/announcements/{id}",
            get(handlers::announcements::get_announcement),
        )
        // GET /api/articles?category=...&search=...
        .route("/articles", get(handlers::articles::list_articles))
        .route("/articles/{id}", get(handlers::articles::get_article))
        .route(
            "/articles/slug/{slug}",
            get(handlers::articles::get_article_by_slug),
        )
        .route("/galleries", get(handlers::galleries::list_galleries))
        .route("/galleries/{id}", get(handlers::galleries::get_gallery))
        // Ordered by grade level, then name.
        .route("/classes", get(handlers::classes::list_classes))
        .route("/classes/{id}", get(handlers::classes::get_class))
        .route(
            "/extracurriculars",
            get(handlers::extracurriculars::list_extracurriculars),
        )
        .route(
            "/extracurriculars/{id}",
            get(handlers::extracurriculars::get_extracurricular),
        )
        // GET /api/contact: 404 until configured.
        .route("/contact", get(handlers::contact::get_contact))
}
