use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{ChangePasswordRequest, LoginRequest, LoginResponse, MeResponse},
    services::account,
};

/// login
///
/// [Public Route] Exchanges email and password for a Bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(account::login(&state, payload).await?))
}

/// get_me
///
/// [Authenticated Route] The caller's profile and permissions grouped by system.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(user: AuthUser) -> Json<MeResponse> {
    Json(account::me(&user))
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password is wrong"),
        (status = 422, description = "New password too short")
    )
)]
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    account::change_password(&state, &user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
