mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, delete, get, json_request, spawn_test_app};
use school_portal::repository::Repository;
use serde_json::{Value, json};
use uuid::Uuid;

async fn post_json(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    app.send(json_request(Method::POST, uri, Some(&app.admin_token), Some(body)))
        .await
}

async fn put_json(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    app.send(json_request(Method::PUT, uri, Some(&app.admin_token), Some(body)))
        .await
}

async fn portal_system_id(app: &TestApp) -> String {
    let (_, systems) = app.send(get("/api/systems", Some(&app.admin_token))).await;
    systems
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "portal")
        .map(|s| s["id"].as_str().unwrap().to_string())
        .unwrap()
}

// --- Users ---

#[tokio::test]
async fn test_user_crud_lifecycle() {
    let app = spawn_test_app().await;
    let (_, role) = post_json(&app, "/api/roles", json!({ "name": "editor" })).await;

    let (status, created) = post_json(
        &app,
        "/api/users",
        json!({
            "name": "Jane Teacher",
            "email": "jane@school.test",
            "password": "password123",
            "role_id": role["id"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"]["name"], "editor");
    assert_eq!(created["is_active"], true);
    assert!(created.get("password").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, page) = app
        .send(get("/api/users?search=jane", Some(&app.admin_token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["email"], "jane@school.test");

    let (status, updated) = put_json(
        &app,
        &format!("/api/users/{id}"),
        json!({ "name": "Jane Principal", "is_active": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Jane Principal");
    assert_eq!(updated["email"], "jane@school.test");
    assert_eq!(updated["is_active"], false);

    let (status, _) = app
        .send(delete(&format!("/api/users/{id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(get(&format!("/api/users/{id}"), Some(&app.admin_token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_validation_and_conflicts() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/users",
        json!({
            "name": "",
            "email": "not-an-email",
            "password": "short",
            "role_id": Uuid::new_v4()
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["name", "email", "password", "role_id"] {
        assert!(body["fields"][field].is_string(), "missing error for {field}");
    }

    let (status, _) = post_json(
        &app,
        "/api/users",
        json!({ "name": "Clone", "email": common::ADMIN_EMAIL, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_user_email_must_stay_unique() {
    let app = spawn_test_app().await;
    let (_, other) = post_json(
        &app,
        "/api/users",
        json!({ "name": "Other", "email": "other@school.test", "password": "password123" }),
    )
    .await;
    let id = other["id"].as_str().unwrap();

    let (status, _) = put_json(
        &app,
        &format!("/api/users/{id}"),
        json!({ "email": common::ADMIN_EMAIL }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Re-sending your own email is not a conflict.
    let (status, _) = put_json(
        &app,
        &format!("/api/users/{id}"),
        json!({ "email": "other@school.test" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_delete_own_account() {
    let app = spawn_test_app().await;

    let (status, _) = app
        .send(delete(&format!("/api/users/{}", app.admin_id), &app.admin_token))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(app.repo.find_user(app.admin_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let app = spawn_test_app().await;
    let (_, token) = app.user_with_permissions(&["users.view"]).await;

    let (status, _) = app.send(get("/api/users", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({ "name": "X", "email": "x@school.test", "password": "password123" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.send(get("/api/roles", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// --- Roles ---

#[tokio::test]
async fn test_role_permissions_are_synced_as_a_set() {
    let app = spawn_test_app().await;
    let create = app.repo.find_permission_by_name("articles.create").await.unwrap().unwrap();
    let update = app.repo.find_permission_by_name("articles.update").await.unwrap().unwrap();

    let (status, role) = post_json(
        &app,
        "/api/roles",
        json!({ "name": "writer", "permission_ids": [create.id, create.id] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["permissions"].as_array().unwrap().len(), 1);
    let id = role["id"].as_str().unwrap();

    let (status, role) = put_json(
        &app,
        &format!("/api/roles/{id}/permissions"),
        json!({ "permission_ids": [update.id] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["permissions"][0]["name"], "articles.update");
    assert_eq!(role["permissions"].as_array().unwrap().len(), 1);

    let (status, body) = put_json(
        &app,
        &format!("/api/roles/{id}/permissions"),
        json!({ "permission_ids": [Uuid::new_v4()] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["permission_ids"].is_string());

    // The failed sync left the previous set alone.
    let (_, role) = app
        .send(get(&format!("/api/roles/{id}"), Some(&app.admin_token)))
        .await;
    assert_eq!(role["permissions"][0]["name"], "articles.update");
}

#[tokio::test]
async fn test_role_name_conflict_and_assigned_role_delete() {
    let app = spawn_test_app().await;

    let (status, _) = post_json(&app, "/api/roles", json!({ "name": "superadmin" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, role) = post_json(&app, "/api/roles", json!({ "name": "librarian" })).await;
    let role_id = role["id"].as_str().unwrap().to_string();
    let (_, user) = post_json(
        &app,
        "/api/users",
        json!({
            "name": "Lib", "email": "lib@school.test", "password": "password123",
            "role_id": role_id
        }),
    )
    .await;

    let (status, _) = app
        .send(delete(&format!("/api/roles/{role_id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // An explicit null unassigns the role; leaving the field out keeps it.
    let user_id = user["id"].as_str().unwrap();
    let (status, updated) =
        put_json(&app, &format!("/api/users/{user_id}"), json!({ "name": "Lib 2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"]["name"], "librarian");

    let (status, updated) =
        put_json(&app, &format!("/api/users/{user_id}"), json!({ "role_id": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["role"].is_null());
    assert_eq!(updated["name"], "Lib 2");

    let (status, _) = app
        .send(delete(&format!("/api/roles/{role_id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(delete(&format!("/api/roles/{role_id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Permissions & systems ---

#[tokio::test]
async fn test_permission_crud_checks_system_and_name() {
    let app = spawn_test_app().await;
    let system_id = portal_system_id(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/permissions",
        json!({ "name": "reports.view", "group_name": "reports", "system_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["system_id"].is_string());

    let (status, _) = post_json(
        &app,
        "/api/permissions",
        json!({ "name": "articles.view", "group_name": "articles", "system_id": system_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, created) = post_json(
        &app,
        "/api/permissions",
        json!({ "name": "reports.view", "group_name": "reports", "system_id": system_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, updated) = put_json(
        &app,
        &format!("/api/permissions/{id}"),
        json!({ "description": "Read reports" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "reports.view");
    assert_eq!(updated["description"], "Read reports");

    let (_, listed) = app
        .send(get(
            &format!("/api/permissions?system_id={system_id}"),
            Some(&app.admin_token),
        ))
        .await;
    assert!(listed.as_array().unwrap().iter().any(|p| p["name"] == "reports.view"));

    let (status, _) = app
        .send(delete(&format!("/api/permissions/{id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_system_with_permissions_cannot_be_deleted() {
    let app = spawn_test_app().await;
    let portal = portal_system_id(&app).await;

    let (status, _) = app
        .send(delete(&format!("/api/systems/{portal}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post_json(&app, "/api/systems", json!({ "name": "portal" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, library) = post_json(
        &app,
        "/api/systems",
        json!({ "name": "library", "description": "Book loans" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = library["id"].as_str().unwrap();

    let (status, renamed) = put_json(
        &app,
        &format!("/api/systems/{id}"),
        json!({ "name": "library-v2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["description"], "Book loans");

    let (status, _) = app
        .send(delete(&format!("/api/systems/{id}"), &app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
