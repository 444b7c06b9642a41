use school_portal::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, RepositoryState, StorageState,
    create_router, seed,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub storage: MockStorageService,
}

/// Serves the full router on a random local port, backed by in-memory stores.
async fn spawn_app() -> TestApp {
    let config = AppConfig {
        admin_email: Some("root@school.test".to_string()),
        admin_password: Some("root-password".to_string()),
        ..AppConfig::default()
    };

    let repo = Arc::new(InMemoryRepository::new());
    seed::run(repo.as_ref(), &config).await.unwrap();

    let storage = MockStorageService::new();
    let state = AppState {
        repo: repo as RepositoryState,
        storage: Arc::new(storage.clone()) as StorageState,
        config,
    };

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let app = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        storage,
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_login_then_publish_article_with_thumbnail() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login: Value = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&json!({ "email": "root@school.test", "password": "root-password" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();

    let form = reqwest::multipart::Form::new()
        .text("title", "Science Fair 2026")
        .text("content", "Projects from every grade.")
        .text("category", "events")
        .text("is_published", "true")
        .part(
            "thumbnail",
            reqwest::multipart::Part::bytes(b"png-bytes".to_vec())
                .file_name("fair.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let response = client
        .post(format!("{}/api/articles", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["slug"], "science-fair-2026");
    assert_eq!(app.storage.keys().len(), 1);

    let public: Value = client
        .get(format!("{}/api/articles/slug/science-fair-2026", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["id"], created["id"]);
    assert_eq!(public["category"], "events");
}

#[tokio::test]
async fn test_anonymous_write_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/contact", app.address))
        .json(&json!({ "address": "a", "phone": "b", "email": "c@d.e" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}
