use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Announcement, Article, Contact, Extracurricular, Gallery, GrantedPermission, Permission,
    Role, SchoolClass, System, User,
};
use crate::pagination::Pagination;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// ContentFilter
///
/// Narrowing applied to a list query. `published_only` and `category` are ignored by
/// tables that have no such column.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub published_only: bool,
    pub search: Option<String>,
    pub category: Option<String>,
    pub pagination: Pagination,
}

impl ContentFilter {
    pub fn new(search: Option<String>, pagination: Pagination) -> Self {
        Self {
            search,
            pagination,
            ..Self::default()
        }
    }

    pub fn published(mut self, published_only: bool) -> Self {
        self.published_only = published_only;
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

/// Repository Trait
///
/// Abstract contract for all persistence. Handlers and services only see this trait,
/// so the Postgres implementation and the in-memory one are interchangeable.
///
/// Writes take a fully-built row: services merge partial updates and stamp
/// timestamps before calling `insert_*` / `update_*`. `update_*` and `delete_*` return
/// `None` / `false` when the id does not exist. `delete_*` on image-bearing content
/// returns the removed row so its object can be cleaned up.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self, filter: &ContentFilter) -> AppResult<(Vec<User>, i64)>;
    async fn insert_user(&self, user: &User) -> AppResult<User>;
    async fn update_user(&self, user: &User) -> AppResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;
    async fn count_users_with_role(&self, role_id: Uuid) -> AppResult<i64>;
    // Permissions reachable through the user's role, with their system names.
    async fn granted_permissions(&self, user_id: Uuid) -> AppResult<Vec<GrantedPermission>>;

    // --- Roles ---
    async fn list_roles(&self) -> AppResult<Vec<Role>>;
    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;
    async fn insert_role(&self, role: &Role) -> AppResult<Role>;
    async fn update_role(&self, role: &Role) -> AppResult<Option<Role>>;
    async fn delete_role(&self, id: Uuid) -> AppResult<bool>;
    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>>;
    // Replaces the whole pivot set for the role.
    async fn set_role_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<()>;

    // --- Permissions ---
    async fn list_permissions(&self, system_id: Option<Uuid>) -> AppResult<Vec<Permission>>;
    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>>;
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;
    async fn insert_permission(&self, permission: &Permission) -> AppResult<Permission>;
    async fn update_permission(&self, permission: &Permission) -> AppResult<Option<Permission>>;
    async fn delete_permission(&self, id: Uuid) -> AppResult<bool>;

    // --- Systems ---
    async fn list_systems(&self) -> AppResult<Vec<System>>;
    async fn find_system(&self, id: Uuid) -> AppResult<Option<System>>;
    async fn find_system_by_name(&self, name: &str) -> AppResult<Option<System>>;
    async fn insert_system(&self, system: &System) -> AppResult<System>;
    async fn update_system(&self, system: &System) -> AppResult<Option<System>>;
    async fn delete_system(&self, id: Uuid) -> AppResult<bool>;

    // --- Announcements ---
    async fn list_announcements(&self, filter: &ContentFilter)
    -> AppResult<(Vec<Announcement>, i64)>;
    async fn find_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>>;
    async fn insert_announcement(&self, row: &Announcement) -> AppResult<Announcement>;
    async fn update_announcement(&self, row: &Announcement) -> AppResult<Option<Announcement>>;
    async fn delete_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>>;

    // --- Articles ---
    async fn list_articles(&self, filter: &ContentFilter) -> AppResult<(Vec<Article>, i64)>;
    async fn find_article(&self, id: Uuid) -> AppResult<Option<Article>>;
    async fn find_article_by_slug(&self, slug: &str) -> AppResult<Option<Article>>;
    async fn insert_article(&self, row: &Article) -> AppResult<Article>;
    async fn update_article(&self, row: &Article) -> AppResult<Option<Article>>;
    async fn delete_article(&self, id: Uuid) -> AppResult<Option<Article>>;

    // --- Galleries ---
    async fn list_galleries(&self, filter: &ContentFilter) -> AppResult<(Vec<Gallery>, i64)>;
    async fn find_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>>;
    async fn insert_gallery(&self, row: &Gallery) -> AppResult<Gallery>;
    async fn update_gallery(&self, row: &Gallery) -> AppResult<Option<Gallery>>;
    async fn delete_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>>;

    // --- Classes ---
    async fn list_classes(&self, filter: &ContentFilter) -> AppResult<(Vec<SchoolClass>, i64)>;
    async fn find_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>>;
    async fn insert_class(&self, row: &SchoolClass) -> AppResult<SchoolClass>;
    async fn update_class(&self, row: &SchoolClass) -> AppResult<Option<SchoolClass>>;
    async fn delete_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>>;

    // --- Extracurriculars ---
    async fn list_extracurriculars(
        &self,
        filter: &ContentFilter,
    ) -> AppResult<(Vec<Extracurricular>, i64)>;
    async fn find_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>>;
    async fn insert_extracurricular(&self, row: &Extracurricular) -> AppResult<Extracurricular>;
    async fn update_extracurricular(
        &self,
        row: &Extracurricular,
    ) -> AppResult<Option<Extracurricular>>;
    async fn delete_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>>;

    // --- Contact ---
    async fn get_contact(&self) -> AppResult<Option<Contact>>;
    /// Writes the single contact row. When one already exists it keeps its id and
    /// `contact.id` is ignored.
    async fn upsert_contact(&self, contact: &Contact) -> AppResult<Contact>;
}

/// RepositoryState
///
/// The shared handle placed in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
