use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod seed;
pub mod services;
pub mod storage;
pub mod uploads;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// Slack on top of `max_upload_bytes` for the text fields of a multipart form.
const FORM_FIELD_ALLOWANCE: usize = 1024 * 1024;

/// ApiDoc
///
/// The OpenAPI document served at `/api-docs/openapi.json`, aggregated from every
/// `#[utoipa::path]` handler and `ToSchema` model.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login, handlers::auth::get_me, handlers::auth::change_password,
        handlers::users::list_users, handlers::users::get_user, handlers::users::create_user,
        handlers::users::update_user, handlers::users::delete_user,
        handlers::roles::list_roles, handlers::roles::get_role, handlers::roles::create_role,
        handlers::roles::update_role, handlers::roles::sync_role_permissions,
        handlers::roles::delete_role,
        handlers::permissions::list_permissions, handlers::permissions::get_permission,
        handlers::permissions::create_permission, handlers::permissions::update_permission,
        handlers::permissions::delete_permission,
        handlers::systems::list_systems, handlers::systems::get_system,
        handlers::systems::create_system, handlers::systems::update_system,
        handlers::systems::delete_system,
        handlers::announcements::list_announcements, handlers::announcements::get_announcement,
        handlers::announcements::list_admin_announcements,
        handlers::announcements::get_admin_announcement,
        handlers::announcements::create_announcement,
        handlers::announcements::update_announcement,
        handlers::announcements::delete_announcement,
        handlers::articles::list_articles, handlers::articles::get_article,
        handlers::articles::get_article_by_slug, handlers::articles::list_admin_articles,
        handlers::articles::get_admin_article, handlers::articles::create_article,
        handlers::articles::update_article, handlers::articles::delete_article,
        handlers::galleries::list_galleries, handlers::galleries::get_gallery,
        handlers::galleries::create_gallery, handlers::galleries::update_gallery,
        handlers::galleries::delete_gallery,
        handlers::classes::list_classes, handlers::classes::get_class,
        handlers::classes::create_class, handlers::classes::update_class,
        handlers::classes::delete_class,
        handlers::extracurriculars::list_extracurriculars,
        handlers::extracurriculars::get_extracurricular,
        handlers::extracurriculars::create_extracurricular,
        handlers::extracurriculars::update_extracurricular,
        handlers::extracurriculars::delete_extracurricular,
        handlers::contact::get_contact, handlers::contact::update_contact,
    ),
    components(
        schemas(
            models::LoginRequest, models::LoginResponse, models::MeResponse,
            models::ChangePasswordRequest, models::UserResponse, models::RoleSummary,
            models::CreateUserRequest, models::UpdateUserRequest,
            models::Role, models::RoleDetail, models::CreateRoleRequest,
            models::UpdateRoleRequest, models::SyncPermissionsRequest,
            models::Permission, models::CreatePermissionRequest,
            models::UpdatePermissionRequest, models::PermissionGroup,
            models::SystemPermissions, models::System, models::SystemRequest,
            models::UpdateSystemRequest,
            models::AnnouncementResponse, models::AnnouncementForm,
            models::ArticleResponse, models::ArticleForm,
            models::GalleryResponse, models::GalleryForm,
            models::SchoolClassResponse, models::SchoolClassForm,
            models::ExtracurricularResponse, models::ExtracurricularForm,
            models::Contact, models::ContactRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "school-portal", description = "School information portal API")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single, cloneable container shared by every request: persistence, object
/// storage and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless the `AuthUser` extractor succeeds. Handlers
/// behind it still extract `AuthUser` themselves for the permission check.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles routing, per-module authentication, the body limit and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let body_limit = state.config.max_upload_bytes + FORM_FIELD_ALLOWANCE;

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, uri and the request id, so every log line of
/// one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
