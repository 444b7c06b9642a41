//! Runs against a real Postgres (`DATABASE_URL`). Ignored by default:
//! `cargo test -- --ignored` with a disposable database.

use chrono::{Duration, Utc};
use school_portal::{
    AppError,
    models::{Article, Contact, Permission, Role, SchoolClass, System, User},
    pagination::Pagination,
    repository::{ContentFilter, PostgresRepository, Repository},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Every fixture name carries a fresh suffix so reruns never collide.
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn create_system(repo: &PostgresRepository) -> System {
    let now = Utc::now();
    repo.insert_system(&System {
        id: Uuid::new_v4(),
        name: unique("system"),
        description: None,
        created_at: now,
        updated_at: now,
    })
    .await
    .unwrap()
}

async fn create_permission(repo: &PostgresRepository, system: &System, group: &str) -> Permission {
    let now = Utc::now();
    repo.insert_permission(&Permission {
        id: Uuid::new_v4(),
        system_id: system.id,
        name: unique(&format!("{group}.view")),
        group_name: group.to_string(),
        description: None,
        created_at: now,
        updated_at: now,
    })
    .await
    .unwrap()
}

async fn create_role(repo: &PostgresRepository) -> Role {
    let now = Utc::now();
    repo.insert_role(&Role {
        id: Uuid::new_v4(),
        name: unique("role"),
        description: None,
        created_at: now,
        updated_at: now,
    })
    .await
    .unwrap()
}

async fn create_user(repo: &PostgresRepository, role_id: Option<Uuid>) -> User {
    let now = Utc::now();
    repo.insert_user(&User {
        id: Uuid::new_v4(),
        name: "Repo Test".to_string(),
        email: format!("{}@school.test", unique("user")),
        password_hash: "$argon2id$placeholder".to_string(),
        role_id,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
    .await
    .unwrap()
}

// --- Tests ---

#[tokio::test]
#[ignore]
async fn test_user_insert_find_and_duplicate_email() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let user = create_user(&repo, None).await;

    let by_id = repo.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, user.email);
    let by_email = repo.find_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let duplicate = repo
        .insert_user(&User {
            id: Uuid::new_v4(),
            ..user.clone()
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    assert!(repo.delete_user(user.id).await.unwrap());
    assert!(!repo.delete_user(user.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_role_permissions_replace_and_grant() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let system = create_system(&repo).await;
    let first = create_permission(&repo, &system, "articles").await;
    let second = create_permission(&repo, &system, "classes").await;
    let role = create_role(&repo).await;
    let user = create_user(&repo, Some(role.id)).await;

    repo.set_role_permissions(role.id, &[first.id, second.id])
        .await
        .unwrap();
    assert_eq!(repo.role_permissions(role.id).await.unwrap().len(), 2);

    repo.set_role_permissions(role.id, &[second.id]).await.unwrap();
    let granted = repo.granted_permissions(user.id).await.unwrap();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].name, second.name);
    assert_eq!(granted[0].system, system.name);

    assert_eq!(repo.count_users_with_role(role.id).await.unwrap(), 1);
    // users.role_id is ON DELETE RESTRICT.
    assert!(matches!(
        repo.delete_role(role.id).await,
        Err(AppError::Conflict(_))
    ));

    repo.delete_user(user.id).await.unwrap();
    assert!(repo.delete_role(role.id).await.unwrap());
    for permission in [first.id, second.id] {
        repo.delete_permission(permission).await.unwrap();
    }
    assert!(repo.delete_system(system.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_article_listing_filters() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let category = unique("category");
    let now = Utc::now();

    let article = |title: &str, published: bool, age_minutes: i64| Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        slug: unique("slug"),
        content: "100% body_text".to_string(),
        category: Some(category.clone()),
        is_published: published,
        published_at: published.then(|| now - Duration::minutes(age_minutes)),
        created_at: now,
        updated_at: now,
        ..Default::default()
    };

    let older = repo.insert_article(&article("Older", true, 10)).await.unwrap();
    let newer = repo.insert_article(&article("Newer", true, 1)).await.unwrap();
    let draft = repo.insert_article(&article("Draft", false, 0)).await.unwrap();

    let filter = ContentFilter::new(None, Pagination::default())
        .published(true)
        .category(Some(category.clone()));
    let (rows, total) = repo.list_articles(&filter).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows[0].id, newer.id);
    assert_eq!(rows[1].id, older.id);

    // LIKE wildcards in the term are matched literally.
    let filter = ContentFilter::new(Some("100%".to_string()), Pagination::default())
        .category(Some(category.clone()));
    assert_eq!(repo.list_articles(&filter).await.unwrap().1, 3);
    let filter = ContentFilter::new(Some("0%_b".to_string()), Pagination::default())
        .category(Some(category.clone()));
    assert_eq!(repo.list_articles(&filter).await.unwrap().1, 0);

    let found = repo.find_article_by_slug(&draft.slug).await.unwrap().unwrap();
    assert_eq!(found.id, draft.id);

    for id in [older.id, newer.id, draft.id] {
        assert!(repo.delete_article(id).await.unwrap().is_some());
    }
}

#[tokio::test]
#[ignore]
async fn test_class_name_is_unique() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let now = Utc::now();

    let class = SchoolClass {
        id: Uuid::new_v4(),
        name: unique("class"),
        grade_level: 9,
        created_at: now,
        updated_at: now,
        ..Default::default()
    };
    repo.insert_class(&class).await.unwrap();

    let clash = repo
        .insert_class(&SchoolClass {
            id: Uuid::new_v4(),
            ..class.clone()
        })
        .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    repo.delete_class(class.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_contact_upsert_overwrites() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let contact = Contact {
        id: Uuid::new_v4(),
        address: "Jl. Test 1".to_string(),
        phone: "021".to_string(),
        email: "info@school.test".to_string(),
        updated_at: Utc::now(),
        ..Default::default()
    };
    let first = repo.upsert_contact(&contact).await.unwrap();

    // A second save with a fresh id lands on the same row.
    let saved = repo
        .upsert_contact(&Contact {
            id: Uuid::new_v4(),
            address: "Jl. Test 2".to_string(),
            ..contact
        })
        .await
        .unwrap();

    assert_eq!(saved.id, first.id);
    assert_eq!(repo.get_contact().await.unwrap().unwrap().address, "Jl. Test 2");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}
