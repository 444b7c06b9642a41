use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every handler here receives a validated `AuthUser` and then checks the specific
/// `<group>.<action>` permission it needs. Content writes take `multipart/form-data`
/// so images travel with the fields; everything else is JSON.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session ---
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/auth/password", put(handlers::auth::change_password))
        // --- Access control ---
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/roles",
            get(handlers::roles::list_roles).post(handlers::roles::create_role),
        )
        .route(
            "/roles/{id}",
            get(handlers::roles::get_role)
                .put(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        // PUT /api/roles/{id}/permissions replaces the whole pivot set.
        .route(
            "/roles/{id}/permissions",
            put(handlers::roles::sync_role_permissions),
        )
        .route(
            "/permissions",
            get(handlers::permissions::list_permissions)
                .post(handlers::permissions::create_permission),
        )
        .route(
            "/permissions/{id}",
            get(handlers::permissions::get_permission)
                .put(handlers::permissions::update_permission)
                .delete(handlers::permissions::delete_permission),
        )
        .route(
            "/systems",
            get(handlers::systems::list_systems).post(handlers::systems::create_system),
        )
        .route(
            "/systems/{id}",
            get(handlers::systems::get_system)
                .put(handlers::systems::update_system)
                .delete(handlers::systems::delete_system),
        )
        // --- Content writes ---
        .route(
            "/announcements",
            post(handlers::announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(handlers::announcements::update_announcement)
                .delete(handlers::announcements::delete_announcement),
        )
        .route("/articles", post(handlers::articles::create_article))
        .route(
            "/articles/{id}",
            put(handlers::articles::update_article).delete(handlers::articles::delete_article),
        )
        .route("/galleries", post(handlers::galleries::create_gallery))
        .route(
            "/galleries/{id}",
            put(handlers::galleries::update_gallery).delete(handlers::galleries::delete_gallery),
        )
        .route("/classes", post(handlers::classes::create_class))
        .route(
            "/classes/{id}",
            put(handlers::classes::update_class).delete(handlers::classes::delete_class),
        )
        .route(
            "/extracurriculars",
            post(handlers::extracurriculars::create_extracurricular),
        )
        .route(
            "/extracurriculars/{id}",
            put(handlers::extracurriculars::update_extracurricular)
                .delete(handlers::extracurriculars::delete_extracurricular),
        )
        // PUT /api/contact: JSON upsert.
        .route("/contact", put(handlers::contact::update_contact))
}
