mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, get, json_request, spawn_test_app, spawn_with, test_config};
use jsonwebtoken::{EncodingKey, Header, encode};
use school_portal::{
    MockStorageService,
    auth::Claims,
    config::Env,
    repository::Repository,
};
use serde_json::json;
use uuid::Uuid;

fn login(email: &str, password: &str) -> Request<Body> {
    json_request(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
}

#[tokio::test]
async fn test_login_returns_bearer_token_and_profile() {
    let app = spawn_test_app().await;

    let (status, body) = app.send(login(ADMIN_EMAIL, ADMIN_PASSWORD)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], app.config.jwt_ttl_seconds);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"]["name"], "superadmin");
    assert!(body["user"].get("password_hash").is_none());

    // The issued token opens protected routes.
    let token = body["access_token"].as_str().unwrap();
    let (status, me) = app.send(get("/api/auth/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = spawn_test_app().await;

    let (wrong_password, body) = app.send(login(ADMIN_EMAIL, "not-the-password")).await;
    let (unknown_email, _) = app.send(login("nobody@school.test", ADMIN_PASSWORD)).await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_inactive_account_cannot_login_or_use_token() {
    let app = spawn_test_app().await;
    let (user_id, token) = app.user_with_permissions(&["articles.view"]).await;

    let mut user = app.repo.find_user(user_id).await.unwrap().unwrap();
    user.is_active = false;
    app.repo.update_user(&user).await.unwrap();

    let (status, _) = app.send(login(&user.email, "staff-password")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = spawn_test_app().await;

    let (missing, _) = app.send(get("/api/auth/me", None)).await;
    let (garbage, _) = app.send(get("/api/auth/me", Some("not.a.jwt"))).await;

    let request = Request::builder()
        .uri("/api/users")
        .header("Authorization", format!("Token {}", app.admin_token))
        .body(Body::empty())
        .unwrap();
    let (wrong_scheme, _) = app.send(request).await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_scheme, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_and_foreign_tokens_are_rejected() {
    let app = spawn_test_app().await;
    let now = Utc::now().timestamp() as usize;

    let expired = encode(
        &Header::default(),
        &Claims {
            sub: app.admin_id,
            iat: now - 7200,
            exp: now - 60,
        },
        &EncodingKey::from_secret(app.config.jwt_secret.as_bytes()),
    )
    .unwrap();

    let foreign = encode(
        &Header::default(),
        &Claims {
            sub: app.admin_id,
            iat: now,
            exp: now + 3600,
        },
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let (status, _) = app.send(get("/api/auth/me", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.send(get("/api/auth/me", Some(&foreign))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_user_stops_working() {
    let app = spawn_test_app().await;
    let (user_id, token) = app.user_with_permissions(&[]).await;

    let (status, _) = app.send(get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    app.repo.delete_user(user_id).await.unwrap();

    let (status, _) = app.send(get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_groups_permissions_by_system_and_group() {
    let app = spawn_test_app().await;
    let (_, token) = app
        .user_with_permissions(&["articles.update", "articles.create", "contact.update"])
        .await;

    let (status, me) = app.send(get("/api/auth/me", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["is_superadmin"], false);
    assert_eq!(
        me["systems"],
        json!([{
            "system": "portal",
            "groups": [
                { "group": "articles", "permissions": ["articles.create", "articles.update"] },
                { "group": "contact", "permissions": ["contact.update"] }
            ]
        }])
    );

    let (_, admin_me) = app.send(get("/api/auth/me", Some(&app.admin_token))).await;
    assert_eq!(admin_me["is_superadmin"], true);
    assert_eq!(admin_me["role"], "superadmin");
}

#[tokio::test]
async fn test_local_user_id_bypass() {
    let app = spawn_test_app().await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-user-id", app.admin_id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], app.admin_id.to_string());

    // An id that matches nobody falls through to the bearer check.
    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-user-id", Uuid::new_v4().to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_id_bypass_is_ignored_in_production() {
    let mut config = test_config();
    config.env = Env::Production;
    let app = spawn_with(config, MockStorageService::new()).await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-user-id", app.admin_id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = spawn_test_app().await;
    let token = app.admin_token.clone();

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": ADMIN_PASSWORD, "new_password": "short" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["new_password"].is_string());

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": "wrong-guess", "new_password": "brand-new-secret" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": ADMIN_PASSWORD, "new_password": "brand-new-secret" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (old, _) = app.send(login(ADMIN_EMAIL, ADMIN_PASSWORD)).await;
    let (new, _) = app.send(login(ADMIN_EMAIL, "brand-new-secret")).await;
    assert_eq!(old, StatusCode::UNAUTHORIZED);
    assert_eq!(new, StatusCode::OK);
}
