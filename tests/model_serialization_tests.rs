use chrono::Utc;
use school_portal::{
    MockStorageService,
    models::{Announcement, CreateRoleRequest, UpdateUserRequest, User, UserResponse},
    pagination::{ListQuery, Page, Pagination},
};
use uuid::Uuid;

#[test]
fn test_user_response_never_exposes_the_hash() {
    let user = User {
        id: Uuid::new_v4(),
        name: "Ana".to_string(),
        email: "ana@school.test".to_string(),
        password_hash: "$argon2id$secret".to_string(),
        role_id: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(UserResponse::from_user(user, None)).unwrap();

    assert!(json.get("password_hash").is_none());
    assert!(!json.to_string().contains("argon2"));
    assert!(json["role"].is_null());
}

#[test]
fn test_partial_update_omits_absent_fields() {
    let req = UpdateUserRequest {
        name: Some("New".to_string()),
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        serde_json::json!({ "name": "New" })
    );
}

#[test]
fn test_update_user_role_null_differs_from_absent() {
    let absent: UpdateUserRequest = serde_json::from_str(r#"{"name":"Ana"}"#).unwrap();
    assert_eq!(absent.role_id, None);

    let cleared: UpdateUserRequest = serde_json::from_str(r#"{"role_id":null}"#).unwrap();
    assert_eq!(cleared.role_id, Some(None));

    let id = Uuid::new_v4();
    let set: UpdateUserRequest =
        serde_json::from_value(serde_json::json!({ "role_id": id })).unwrap();
    assert_eq!(set.role_id, Some(Some(id)));
}

#[test]
fn test_role_request_permission_ids_default_to_empty() {
    let req: CreateRoleRequest = serde_json::from_str(r#"{"name":"editor"}"#).unwrap();
    assert!(req.permission_ids.is_empty());
    assert!(req.description.is_none());
}

#[test]
fn test_row_keys_become_public_urls() {
    let storage = MockStorageService::new();
    let row = Announcement {
        image_key: Some("announcements/a.png".to_string()),
        ..Default::default()
    };

    let response = row.into_response(&storage);

    assert_eq!(
        response.image_url.as_deref(),
        Some("http://localhost:9000/mock-bucket/announcements/a.png")
    );
    assert!(Announcement::default().into_response(&storage).image_url.is_none());
}

#[test]
fn test_page_envelope_shape() {
    let query = ListQuery {
        page: Some(0),
        per_page: Some(500),
        search: Some("   ".to_string()),
    };
    let pagination = query.pagination();
    assert_eq!(pagination, Pagination { page: 1, per_page: 100 });
    assert!(query.search_term().is_none());

    let page = Page::new(vec![1, 2, 3], pagination, 42).map(|n| n * 10);
    assert_eq!(
        serde_json::to_value(&page).unwrap(),
        serde_json::json!({ "data": [10, 20, 30], "page": 1, "per_page": 100, "total": 42 })
    );
}
