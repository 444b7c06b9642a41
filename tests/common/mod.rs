#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use school_portal::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, RepositoryState, StorageState,
    auth::{hash_password, issue_token},
    create_router,
    models::{Role, User},
    repository::Repository,
    seed,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@school.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// TestApp
///
/// A fully wired router over the in-memory repository and the mock object store. The
/// handles to both stay available so tests can seed rows and inspect uploads.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub storage: MockStorageService,
    pub config: AppConfig,
    pub admin_id: Uuid,
    pub admin_token: String,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..AppConfig::default()
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with(test_config(), MockStorageService::new()).await
}

pub async fn spawn_with(config: AppConfig, storage: MockStorageService) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    seed::run(repo.as_ref(), &config)
        .await
        .expect("seeding the in-memory repository failed");

    let admin = repo
        .find_user_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .expect("seeded administrator missing");
    let (admin_token, _) =
        issue_token(admin.id, &config.jwt_secret, config.jwt_ttl_seconds).unwrap();

    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: Arc::new(storage.clone()) as StorageState,
        config: config.clone(),
    };

    TestApp {
        router: create_router(state),
        repo,
        storage,
        config,
        admin_id: admin.id,
        admin_token,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Creates an active user whose role holds exactly `permissions` and returns a
    /// token for them.
    pub async fn user_with_permissions(&self, permissions: &[&str]) -> (Uuid, String) {
        let now = Utc::now();
        let role = self
            .repo
            .insert_role(&Role {
                id: Uuid::new_v4(),
                name: format!("role-{}", Uuid::new_v4()),
                description: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for name in permissions {
            let permission = self
                .repo
                .find_permission_by_name(name)
                .await
                .unwrap()
                .unwrap_or_else(|| panic!("unknown permission {name}"));
            ids.push(permission.id);
        }
        self.repo.set_role_permissions(role.id, &ids).await.unwrap();

        let user = self
            .repo
            .insert_user(&User {
                id: Uuid::new_v4(),
                name: "Staff Member".to_string(),
                email: format!("{}@school.test", Uuid::new_v4()),
                password_hash: hash_password("staff-password").unwrap(),
                role_id: Some(role.id),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let (token, _) =
            issue_token(user.id, &self.config.jwt_secret, self.config.jwt_ttl_seconds).unwrap();
        (user.id, token)
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    json_request(Method::GET, uri, token, None)
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    json_request(Method::DELETE, uri, Some(token), None)
}

const BOUNDARY: &str = "school-portal-test-boundary";

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// A tiny PNG-typed payload under the given field name.
    pub fn png(self, name: &str) -> Self {
        self.file(name, "photo.png", "image/png", b"\x89PNG\r\n\x1a\nfake-image-bytes")
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: &str,
    body: MultipartBody,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body.finish()))
        .unwrap()
}

/// The object key behind a public URL produced by `MockStorageService`.
pub fn key_of(url: &Value) -> String {
    url.as_str()
        .and_then(|u| u.strip_prefix("http://localhost:9000/mock-bucket/"))
        .expect("not a mock storage URL")
        .to_string()
}
