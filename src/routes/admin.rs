use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Back-office reads nested under `/api/admin`. Unlike their public twins these include
/// drafts; access needs any permission in the matching group.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/announcements",
            get(handlers::announcements::list_admin_announcements),
        )
        .route(
            "/announcements/{id}",
            get(handlers::announcements::get_admin_announcement),
        )
        .route("/articles", get(handlers::articles::list_admin_articles))
        .route("/articles/{id}", get(handlers::articles::get_admin_article))
}
