//! HTTP controllers. Each handler extracts its inputs, checks the caller's
//! permission and delegates to the matching service.

pub mod announcements;
pub mod articles;
pub mod auth;
pub mod classes;
pub mod contact;
pub mod extracurriculars;
pub mod galleries;
pub mod permissions;
pub mod roles;
pub mod systems;
pub mod users;

/// health
///
/// [Public Route] Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
