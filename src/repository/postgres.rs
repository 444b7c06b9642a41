use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgRow};
use uuid::Uuid;

use super::{ContentFilter, Repository};
use crate::error::AppResult;
use crate::models::{
    Announcement, Article, Contact, Extracurricular, Gallery, GrantedPermission, Permission,
    Role, SchoolClass, System, User,
};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role_id, is_active, created_at, updated_at";
const ROLE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const PERMISSION_COLUMNS: &str =
    "id, system_id, name, group_name, description, created_at, updated_at";
const SYSTEM_COLUMNS: &str = "id, name, description, created_at, updated_at";
const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, image_key, is_published, published_at, author_id, created_at, updated_at";
const ARTICLE_COLUMNS: &str = "id, title, slug, excerpt, content, category, thumbnail_key, is_published, published_at, author_id, created_at, updated_at";
const GALLERY_COLUMNS: &str = "id, title, description, image_key, created_at, updated_at";
const CLASS_COLUMNS: &str =
    "id, name, grade_level, homeroom_teacher, description, image_key, created_at, updated_at";
const EXTRACURRICULAR_COLUMNS: &str =
    "id, name, description, coach, schedule, image_key, created_at, updated_at";
const CONTACT_COLUMNS: &str = "id, address, phone, email, whatsapp, website, map_embed_url, facebook_url, instagram_url, youtube_url, updated_at";

/// How a table is listed: which columns `search` matches and how rows are ordered.
struct Listing {
    table: &'static str,
    columns: &'static str,
    search_columns: &'static [&'static str],
    publishable: bool,
    categorized: bool,
    order_by: &'static str,
}

const USERS: Listing = Listing {
    table: "users",
    columns: USER_COLUMNS,
    search_columns: &["name", "email"],
    publishable: false,
    categorized: false,
    order_by: "name ASC",
};

const ANNOUNCEMENTS: Listing = Listing {
    table: "announcements",
    columns: ANNOUNCEMENT_COLUMNS,
    search_columns: &["title", "content"],
    publishable: true,
    categorized: false,
    order_by: "COALESCE(published_at, created_at) DESC",
};

const ARTICLES: Listing = Listing {
    table: "articles",
    columns: ARTICLE_COLUMNS,
    search_columns: &["title", "excerpt", "content"],
    publishable: true,
    categorized: true,
    order_by: "COALESCE(published_at, created_at) DESC",
};

const GALLERIES: Listing = Listing {
    table: "galleries",
    columns: GALLERY_COLUMNS,
    search_columns: &["title", "description"],
    publishable: false,
    categorized: false,
    order_by: "created_at DESC",
};

const CLASSES: Listing = Listing {
    table: "classes",
    columns: CLASS_COLUMNS,
    search_columns: &["name", "homeroom_teacher"],
    publishable: false,
    categorized: false,
    order_by: "grade_level ASC, name ASC",
};

const EXTRACURRICULARS: Listing = Listing {
    table: "extracurriculars",
    columns: EXTRACURRICULAR_COLUMNS,
    search_columns: &["name", "description", "coach"],
    publishable: false,
    categorized: false,
    order_by: "name ASC",
};

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &ContentFilter, listing: &Listing) {
    if listing.publishable && filter.published_only {
        builder.push(" AND is_published = TRUE");
    }

    if listing.categorized {
        if let Some(category) = &filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.clone());
        }
    }

    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        builder.push(" AND (");
        for (i, column) in listing.search_columns.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push(*column);
            builder.push(" ILIKE ");
            builder.push_bind(pattern.clone());
        }
        builder.push(")");
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Every query binds its
/// parameters; list filters are assembled with `QueryBuilder`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the COUNT and the paged SELECT for one table with identical filters.
    async fn fetch_page<T>(&self, listing: &Listing, filter: &ContentFilter) -> AppResult<(Vec<T>, i64)>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE TRUE", listing.table));
        push_filters(&mut count, filter, listing);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            listing.columns, listing.table
        ));
        push_filters(&mut select, filter, listing);
        select.push(format!(" ORDER BY {} LIMIT ", listing.order_by));
        select.push_bind(filter.pagination.limit());
        select.push(" OFFSET ");
        select.push_bind(filter.pagination.offset());

        let rows = select.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    async fn find_by_id<T>(&self, table: &str, columns: &str, id: Uuid) -> AppResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT {columns} FROM {table} WHERE id = $1");
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_returning<T>(&self, table: &str, columns: &str, id: Uuid) -> AppResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("DELETE FROM {table} WHERE id = $1 RETURNING {columns}");
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.find_by_id("users", USER_COLUMNS, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, filter: &ContentFilter) -> AppResult<(Vec<User>, i64)> {
        self.fetch_page(&USERS, filter).await
    }

    async fn insert_user(&self, user: &User) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .bind(user.is_active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_user(&self, user: &User) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role_id = $5, is_active = $6, updated_at = $7 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .bind(user.is_active)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("users", id).await
    }

    async fn count_users_with_role(&self, role_id: Uuid) -> AppResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn granted_permissions(&self, user_id: Uuid) -> AppResult<Vec<GrantedPermission>> {
        Ok(sqlx::query_as::<_, GrantedPermission>(
            r#"
            SELECT p.name, p.group_name, s.name AS system
            FROM users u
            JOIN role_permissions rp ON rp.role_id = u.role_id
            JOIN permissions p ON p.id = rp.permission_id
            JOIN systems s ON s.id = p.system_id
            WHERE u.id = $1
            ORDER BY s.name, p.group_name, p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // --- ROLES ---

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let sql = format!("SELECT {ROLE_COLUMNS} FROM roles ORDER BY name ASC");
        Ok(sqlx::query_as::<_, Role>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        self.find_by_id("roles", ROLE_COLUMNS, id).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let sql = format!("SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1");
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_role(&self, role: &Role) -> AppResult<Role> {
        let sql = format!(
            "INSERT INTO roles ({ROLE_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {ROLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(role.created_at)
            .bind(role.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_role(&self, role: &Role) -> AppResult<Option<Role>> {
        let sql = format!(
            "UPDATE roles SET name = $2, description = $3, updated_at = $4 WHERE id = $1 RETURNING {ROLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(role.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("roles", id).await
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        Ok(sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.system_id, p.name, p.group_name, p.description, p.created_at, p.updated_at
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.group_name, p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Delete-then-insert inside one transaction so readers never see a half set.
    async fn set_role_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        if !permission_ids.is_empty() {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
            )
            .bind(role_id)
            .bind(permission_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // --- PERMISSIONS ---

    async fn list_permissions(&self, system_id: Option<Uuid>) -> AppResult<Vec<Permission>> {
        let sql = format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE ($1::uuid IS NULL OR system_id = $1) ORDER BY group_name, name"
        );
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(system_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>> {
        self.find_by_id("permissions", PERMISSION_COLUMNS, id).await
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let sql = format!("SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = $1");
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_permission(&self, permission: &Permission) -> AppResult<Permission> {
        let sql = format!(
            "INSERT INTO permissions ({PERMISSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PERMISSION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(permission.id)
            .bind(permission.system_id)
            .bind(&permission.name)
            .bind(&permission.group_name)
            .bind(&permission.description)
            .bind(permission.created_at)
            .bind(permission.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<Option<Permission>> {
        let sql = format!(
            "UPDATE permissions SET system_id = $2, name = $3, group_name = $4, description = $5, updated_at = $6 WHERE id = $1 RETURNING {PERMISSION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(permission.id)
            .bind(permission.system_id)
            .bind(&permission.name)
            .bind(&permission.group_name)
            .bind(&permission.description)
            .bind(permission.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("permissions", id).await
    }

    // --- SYSTEMS ---

    async fn list_systems(&self) -> AppResult<Vec<System>> {
        let sql = format!("SELECT {SYSTEM_COLUMNS} FROM systems ORDER BY name ASC");
        Ok(sqlx::query_as::<_, System>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_system(&self, id: Uuid) -> AppResult<Option<System>> {
        self.find_by_id("systems", SYSTEM_COLUMNS, id).await
    }

    async fn find_system_by_name(&self, name: &str) -> AppResult<Option<System>> {
        let sql = format!("SELECT {SYSTEM_COLUMNS} FROM systems WHERE name = $1");
        Ok(sqlx::query_as::<_, System>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_system(&self, system: &System) -> AppResult<System> {
        let sql = format!(
            "INSERT INTO systems ({SYSTEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {SYSTEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, System>(&sql)
            .bind(system.id)
            .bind(&system.name)
            .bind(&system.description)
            .bind(system.created_at)
            .bind(system.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_system(&self, system: &System) -> AppResult<Option<System>> {
        let sql = format!(
            "UPDATE systems SET name = $2, description = $3, updated_at = $4 WHERE id = $1 RETURNING {SYSTEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, System>(&sql)
            .bind(system.id)
            .bind(&system.name)
            .bind(&system.description)
            .bind(system.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_system(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("systems", id).await
    }

    // --- ANNOUNCEMENTS ---

    async fn list_announcements(
        &self,
        filter: &ContentFilter,
    ) -> AppResult<(Vec<Announcement>, i64)> {
        self.fetch_page(&ANNOUNCEMENTS, filter).await
    }

    async fn find_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        self.find_by_id("announcements", ANNOUNCEMENT_COLUMNS, id).await
    }

    async fn insert_announcement(&self, row: &Announcement) -> AppResult<Announcement> {
        let sql = format!(
            "INSERT INTO announcements ({ANNOUNCEMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.content)
            .bind(&row.image_key)
            .bind(row.is_published)
            .bind(row.published_at)
            .bind(row.author_id)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_announcement(&self, row: &Announcement) -> AppResult<Option<Announcement>> {
        let sql = format!(
            "UPDATE announcements SET title = $2, content = $3, image_key = $4, is_published = $5, published_at = $6, updated_at = $7 WHERE id = $1 RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.content)
            .bind(&row.image_key)
            .bind(row.is_published)
            .bind(row.published_at)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        self.delete_returning("announcements", ANNOUNCEMENT_COLUMNS, id)
            .await
    }

    // --- ARTICLES ---

    async fn list_articles(&self, filter: &ContentFilter) -> AppResult<(Vec<Article>, i64)> {
        self.fetch_page(&ARTICLES, filter).await
    }

    async fn find_article(&self, id: Uuid) -> AppResult<Option<Article>> {
        self.find_by_id("articles", ARTICLE_COLUMNS, id).await
    }

    async fn find_article_by_slug(&self, slug: &str) -> AppResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_article(&self, row: &Article) -> AppResult<Article> {
        let sql = format!(
            "INSERT INTO articles ({ARTICLE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {ARTICLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.slug)
            .bind(&row.excerpt)
            .bind(&row.content)
            .bind(&row.category)
            .bind(&row.thumbnail_key)
            .bind(row.is_published)
            .bind(row.published_at)
            .bind(row.author_id)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_article(&self, row: &Article) -> AppResult<Option<Article>> {
        let sql = format!(
            "UPDATE articles SET title = $2, slug = $3, excerpt = $4, content = $5, category = $6, thumbnail_key = $7, is_published = $8, published_at = $9, updated_at = $10 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.slug)
            .bind(&row.excerpt)
            .bind(&row.content)
            .bind(&row.category)
            .bind(&row.thumbnail_key)
            .bind(row.is_published)
            .bind(row.published_at)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_article(&self, id: Uuid) -> AppResult<Option<Article>> {
        self.delete_returning("articles", ARTICLE_COLUMNS, id).await
    }

    // --- GALLERIES ---

    async fn list_galleries(&self, filter: &ContentFilter) -> AppResult<(Vec<Gallery>, i64)> {
        self.fetch_page(&GALLERIES, filter).await
    }

    async fn find_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        self.find_by_id("galleries", GALLERY_COLUMNS, id).await
    }

    async fn insert_gallery(&self, row: &Gallery) -> AppResult<Gallery> {
        let sql = format!(
            "INSERT INTO galleries ({GALLERY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {GALLERY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Gallery>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.description)
            .bind(&row.image_key)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_gallery(&self, row: &Gallery) -> AppResult<Option<Gallery>> {
        let sql = format!(
            "UPDATE galleries SET title = $2, description = $3, image_key = $4, updated_at = $5 WHERE id = $1 RETURNING {GALLERY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Gallery>(&sql)
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.description)
            .bind(&row.image_key)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        self.delete_returning("galleries", GALLERY_COLUMNS, id).await
    }

    // --- CLASSES ---

    async fn list_classes(&self, filter: &ContentFilter) -> AppResult<(Vec<SchoolClass>, i64)> {
        self.fetch_page(&CLASSES, filter).await
    }

    async fn find_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>> {
        self.find_by_id("classes", CLASS_COLUMNS, id).await
    }

    async fn insert_class(&self, row: &SchoolClass) -> AppResult<SchoolClass> {
        let sql = format!(
            "INSERT INTO classes ({CLASS_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {CLASS_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, SchoolClass>(&sql)
            .bind(row.id)
            .bind(&row.name)
            .bind(row.grade_level)
            .bind(&row.homeroom_teacher)
            .bind(&row.description)
            .bind(&row.image_key)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_class(&self, row: &SchoolClass) -> AppResult<Option<SchoolClass>> {
        let sql = format!(
            "UPDATE classes SET name = $2, grade_level = $3, homeroom_teacher = $4, description = $5, image_key = $6, updated_at = $7 WHERE id = $1 RETURNING {CLASS_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, SchoolClass>(&sql)
            .bind(row.id)
            .bind(&row.name)
            .bind(row.grade_level)
            .bind(&row.homeroom_teacher)
            .bind(&row.description)
            .bind(&row.image_key)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>> {
        self.delete_returning("classes", CLASS_COLUMNS, id).await
    }

    // --- EXTRACURRICULARS ---

    async fn list_extracurriculars(
        &self,
        filter: &ContentFilter,
    ) -> AppResult<(Vec<Extracurricular>, i64)> {
        self.fetch_page(&EXTRACURRICULARS, filter).await
    }

    async fn find_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>> {
        self.find_by_id("extracurriculars", EXTRACURRICULAR_COLUMNS, id)
            .await
    }

    async fn insert_extracurricular(&self, row: &Extracurricular) -> AppResult<Extracurricular> {
        let sql = format!(
            "INSERT INTO extracurriculars ({EXTRACURRICULAR_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {EXTRACURRICULAR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Extracurricular>(&sql)
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.coach)
            .bind(&row.schedule)
            .bind(&row.image_key)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_extracurricular(
        &self,
        row: &Extracurricular,
    ) -> AppResult<Option<Extracurricular>> {
        let sql = format!(
            "UPDATE extracurriculars SET name = $2, description = $3, coach = $4, schedule = $5, image_key = $6, updated_at = $7 WHERE id = $1 RETURNING {EXTRACURRICULAR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Extracurricular>(&sql)
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.coach)
            .bind(&row.schedule)
            .bind(&row.image_key)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>> {
        self.delete_returning("extracurriculars", EXTRACURRICULAR_COLUMNS, id)
            .await
    }

    // --- CONTACT ---

    async fn get_contact(&self) -> AppResult<Option<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts LIMIT 1");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_contact(&self, contact: &Contact) -> AppResult<Contact> {
        let sql = format!(
            r#"
            INSERT INTO contacts ({CONTACT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (singleton) DO UPDATE SET
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                whatsapp = EXCLUDED.whatsapp,
                website = EXCLUDED.website,
                map_embed_url = EXCLUDED.map_embed_url,
                facebook_url = EXCLUDED.facebook_url,
                instagram_url = EXCLUDED.instagram_url,
                youtube_url = EXCLUDED.youtube_url,
                updated_at = EXCLUDED.updated_at
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(contact.id)
            .bind(&contact.address)
            .bind(&contact.phone)
            .bind(&contact.email)
            .bind(&contact.whatsapp)
            .bind(&contact.website)
            .bind(&contact.map_embed_url)
            .bind(&contact.facebook_url)
            .bind(&contact.instagram_url)
            .bind(&contact.youtube_url)
            .bind(contact.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }
}
