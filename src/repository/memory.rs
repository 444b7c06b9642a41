use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{ContentFilter, Repository};
use crate::error::{AppError, AppResult};
use crate::models::{
    Announcement, Article, Contact, Extracurricular, Gallery, GrantedPermission, Permission,
    Role, SchoolClass, System, User,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    permissions: HashMap<Uuid, Permission>,
    systems: HashMap<Uuid, System>,
    // (role_id, permission_id)
    role_permissions: BTreeSet<(Uuid, Uuid)>,
    announcements: HashMap<Uuid, Announcement>,
    articles: HashMap<Uuid, Article>,
    galleries: HashMap<Uuid, Gallery>,
    classes: HashMap<Uuid, SchoolClass>,
    extracurriculars: HashMap<Uuid, Extracurricular>,
    contact: Option<Contact>,
}

/// InMemoryRepository
///
/// A `Repository` over plain maps, used by the router tests. It mirrors the Postgres
/// implementation's ordering, filtering and unique constraints so handlers behave
/// the same against both.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    fail_content_writes: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every content insert/update fail, to exercise upload rollback.
    pub fn fail_content_writes(&self, fail: bool) {
        self.fail_content_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_content_write(&self) -> AppResult<()> {
        if self.fail_content_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated write failure".to_string()));
        }
        Ok(())
    }
}

fn duplicate(constraint: &str) -> AppError {
    AppError::Conflict(format!("duplicate value violates {}", constraint))
}

fn matches(term: Option<&str>, haystacks: &[Option<&str>]) -> bool {
    let Some(term) = term else {
        return true;
    };
    let needle = term.to_lowercase();
    haystacks
        .iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(&needle))
}

fn page<T>(mut rows: Vec<T>, filter: &ContentFilter) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let offset = filter.pagination.offset() as usize;
    let limit = filter.pagination.limit() as usize;
    let data = if offset >= rows.len() {
        Vec::new()
    } else {
        rows.drain(offset..).take(limit).collect()
    };
    (data, total)
}

fn replace<T: Clone>(map: &mut HashMap<Uuid, T>, id: Uuid, row: &T) -> Option<T> {
    let slot = map.get_mut(&id)?;
    *slot = row.clone();
    Some(row.clone())
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- USERS ---

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self, filter: &ContentFilter) -> AppResult<(Vec<User>, i64)> {
        let mut rows: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|u| {
                matches(
                    filter.search.as_deref(),
                    &[Some(u.name.as_str()), Some(u.email.as_str())],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(rows, filter))
    }

    async fn insert_user(&self, user: &User) -> AppResult<User> {
        let mut tables = self.lock();
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(duplicate("users_email_key"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> AppResult<Option<User>> {
        let mut tables = self.lock();
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(duplicate("users_email_key"));
        }
        Ok(replace(&mut tables.users, user.id, user))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.lock().users.remove(&id).is_some())
    }

    async fn count_users_with_role(&self, role_id: Uuid) -> AppResult<i64> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.role_id == Some(role_id))
            .count() as i64)
    }

    async fn granted_permissions(&self, user_id: Uuid) -> AppResult<Vec<GrantedPermission>> {
        let tables = self.lock();
        let Some(role_id) = tables.users.get(&user_id).and_then(|u| u.role_id) else {
            return Ok(Vec::new());
        };

        let mut granted: Vec<GrantedPermission> = tables
            .role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, pid)| tables.permissions.get(pid))
            .filter_map(|p| {
                tables.systems.get(&p.system_id).map(|s| GrantedPermission {
                    name: p.name.clone(),
                    group_name: p.group_name.clone(),
                    system: s.name.clone(),
                })
            })
            .collect();
        granted.sort_by(|a, b| {
            (&a.system, &a.group_name, &a.name).cmp(&(&b.system, &b.group_name, &b.name))
        });
        Ok(granted)
    }

    // --- ROLES ---

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.lock().roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.lock().roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.lock().roles.values().find(|r| r.name == name).cloned())
    }

    async fn insert_role(&self, role: &Role) -> AppResult<Role> {
        let mut tables = self.lock();
        if tables.roles.values().any(|r| r.name == role.name) {
            return Err(duplicate("roles_name_key"));
        }
        tables.roles.insert(role.id, role.clone());
        Ok(role.clone())
    }

    async fn update_role(&self, role: &Role) -> AppResult<Option<Role>> {
        let mut tables = self.lock();
        if tables
            .roles
            .values()
            .any(|r| r.id != role.id && r.name == role.name)
        {
            return Err(duplicate("roles_name_key"));
        }
        Ok(replace(&mut tables.roles, role.id, role))
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.lock();
        if tables.users.values().any(|u| u.role_id == Some(id)) {
            return Err(AppError::Conflict("record is still referenced".to_string()));
        }
        tables.role_permissions.retain(|(rid, _)| *rid != id);
        Ok(tables.roles.remove(&id).is_some())
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let tables = self.lock();
        let mut permissions: Vec<Permission> = tables
            .role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, pid)| tables.permissions.get(pid).cloned())
            .collect();
        permissions.sort_by(|a, b| (&a.group_name, &a.name).cmp(&(&b.group_name, &b.name)));
        Ok(permissions)
    }

    async fn set_role_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<()> {
        let mut tables = self.lock();
        if permission_ids
            .iter()
            .any(|id| !tables.permissions.contains_key(id))
        {
            return Err(AppError::Conflict("record is still referenced".to_string()));
        }
        tables.role_permissions.retain(|(rid, _)| *rid != role_id);
        for pid in permission_ids {
            tables.role_permissions.insert((role_id, *pid));
        }
        Ok(())
    }

    // --- PERMISSIONS ---

    async fn list_permissions(&self, system_id: Option<Uuid>) -> AppResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> = self
            .lock()
            .permissions
            .values()
            .filter(|p| system_id.is_none_or(|sid| p.system_id == sid))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| (&a.group_name, &a.name).cmp(&(&b.group_name, &b.name)));
        Ok(permissions)
    }

    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>> {
        Ok(self.lock().permissions.get(&id).cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .lock()
            .permissions
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn insert_permission(&self, permission: &Permission) -> AppResult<Permission> {
        let mut tables = self.lock();
        if tables.permissions.values().any(|p| p.name == permission.name) {
            return Err(duplicate("permissions_name_key"));
        }
        if !tables.systems.contains_key(&permission.system_id) {
            return Err(AppError::Conflict("record is still referenced".to_string()));
        }
        tables.permissions.insert(permission.id, permission.clone());
        Ok(permission.clone())
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<Option<Permission>> {
        let mut tables = self.lock();
        if tables
            .permissions
            .values()
            .any(|p| p.id != permission.id && p.name == permission.name)
        {
            return Err(duplicate("permissions_name_key"));
        }
        Ok(replace(&mut tables.permissions, permission.id, permission))
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.lock();
        tables.role_permissions.retain(|(_, pid)| *pid != id);
        Ok(tables.permissions.remove(&id).is_some())
    }

    // --- SYSTEMS ---

    async fn list_systems(&self) -> AppResult<Vec<System>> {
        let mut systems: Vec<System> = self.lock().systems.values().cloned().collect();
        systems.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(systems)
    }

    async fn find_system(&self, id: Uuid) -> AppResult<Option<System>> {
        Ok(self.lock().systems.get(&id).cloned())
    }

    async fn find_system_by_name(&self, name: &str) -> AppResult<Option<System>> {
        Ok(self.lock().systems.values().find(|s| s.name == name).cloned())
    }

    async fn insert_system(&self, system: &System) -> AppResult<System> {
        let mut tables = self.lock();
        if tables.systems.values().any(|s| s.name == system.name) {
            return Err(duplicate("systems_name_key"));
        }
        tables.systems.insert(system.id, system.clone());
        Ok(system.clone())
    }

    async fn update_system(&self, system: &System) -> AppResult<Option<System>> {
        let mut tables = self.lock();
        if tables
            .systems
            .values()
            .any(|s| s.id != system.id && s.name == system.name)
        {
            return Err(duplicate("systems_name_key"));
        }
        Ok(replace(&mut tables.systems, system.id, system))
    }

    async fn delete_system(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.lock();
        if tables.permissions.values().any(|p| p.system_id == id) {
            return Err(AppError::Conflict("record is still referenced".to_string()));
        }
        Ok(tables.systems.remove(&id).is_some())
    }

    // --- ANNOUNCEMENTS ---

    async fn list_announcements(
        &self,
        filter: &ContentFilter,
    ) -> AppResult<(Vec<Announcement>, i64)> {
        let mut rows: Vec<Announcement> = self
            .lock()
            .announcements
            .values()
            .filter(|a| !filter.published_only || a.is_published)
            .filter(|a| {
                matches(
                    filter.search.as_deref(),
                    &[Some(a.title.as_str()), Some(a.content.as_str())],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.published_at
                .unwrap_or(b.created_at)
                .cmp(&a.published_at.unwrap_or(a.created_at))
        });
        Ok(page(rows, filter))
    }

    async fn find_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        Ok(self.lock().announcements.get(&id).cloned())
    }

    async fn insert_announcement(&self, row: &Announcement) -> AppResult<Announcement> {
        self.check_content_write()?;
        self.lock().announcements.insert(row.id, row.clone());
        Ok(row.clone())
    }

    async fn update_announcement(&self, row: &Announcement) -> AppResult<Option<Announcement>> {
        self.check_content_write()?;
        Ok(replace(&mut self.lock().announcements, row.id, row))
    }

    async fn delete_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        Ok(self.lock().announcements.remove(&id))
    }

    // --- ARTICLES ---

    async fn list_articles(&self, filter: &ContentFilter) -> AppResult<(Vec<Article>, i64)> {
        let mut rows: Vec<Article> = self
            .lock()
            .articles
            .values()
            .filter(|a| !filter.published_only || a.is_published)
            .filter(|a| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|c| a.category.as_ref() == Some(c))
            })
            .filter(|a| {
                matches(
                    filter.search.as_deref(),
                    &[
                        Some(a.title.as_str()),
                        a.excerpt.as_deref(),
                        Some(a.content.as_str()),
                    ],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.published_at
                .unwrap_or(b.created_at)
                .cmp(&a.published_at.unwrap_or(a.created_at))
        });
        Ok(page(rows, filter))
    }

    async fn find_article(&self, id: Uuid) -> AppResult<Option<Article>> {
        Ok(self.lock().articles.get(&id).cloned())
    }

    async fn find_article_by_slug(&self, slug: &str) -> AppResult<Option<Article>> {
        Ok(self.lock().articles.values().find(|a| a.slug == slug).cloned())
    }

    async fn insert_article(&self, row: &Article) -> AppResult<Article> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables.articles.values().any(|a| a.slug == row.slug) {
            return Err(duplicate("articles_slug_key"));
        }
        tables.articles.insert(row.id, row.clone());
        Ok(row.clone())
    }

    async fn update_article(&self, row: &Article) -> AppResult<Option<Article>> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables
            .articles
            .values()
            .any(|a| a.id != row.id && a.slug == row.slug)
        {
            return Err(duplicate("articles_slug_key"));
        }
        Ok(replace(&mut tables.articles, row.id, row))
    }

    async fn delete_article(&self, id: Uuid) -> AppResult<Option<Article>> {
        Ok(self.lock().articles.remove(&id))
    }

    // --- GALLERIES ---

    async fn list_galleries(&self, filter: &ContentFilter) -> AppResult<(Vec<Gallery>, i64)> {
        let mut rows: Vec<Gallery> = self
            .lock()
            .galleries
            .values()
            .filter(|g| {
                matches(
                    filter.search.as_deref(),
                    &[Some(g.title.as_str()), g.description.as_deref()],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(rows, filter))
    }

    async fn find_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        Ok(self.lock().galleries.get(&id).cloned())
    }

    async fn insert_gallery(&self, row: &Gallery) -> AppResult<Gallery> {
        self.check_content_write()?;
        self.lock().galleries.insert(row.id, row.clone());
        Ok(row.clone())
    }

    async fn update_gallery(&self, row: &Gallery) -> AppResult<Option<Gallery>> {
        self.check_content_write()?;
        Ok(replace(&mut self.lock().galleries, row.id, row))
    }

    async fn delete_gallery(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        Ok(self.lock().galleries.remove(&id))
    }

    // --- CLASSES ---

    async fn list_classes(&self, filter: &ContentFilter) -> AppResult<(Vec<SchoolClass>, i64)> {
        let mut rows: Vec<SchoolClass> = self
            .lock()
            .classes
            .values()
            .filter(|c| {
                matches(
                    filter.search.as_deref(),
                    &[Some(c.name.as_str()), c.homeroom_teacher.as_deref()],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.grade_level, &a.name).cmp(&(b.grade_level, &b.name)));
        Ok(page(rows, filter))
    }

    async fn find_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>> {
        Ok(self.lock().classes.get(&id).cloned())
    }

    async fn insert_class(&self, row: &SchoolClass) -> AppResult<SchoolClass> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables.classes.values().any(|c| c.name == row.name) {
            return Err(duplicate("classes_name_key"));
        }
        tables.classes.insert(row.id, row.clone());
        Ok(row.clone())
    }

    async fn update_class(&self, row: &SchoolClass) -> AppResult<Option<SchoolClass>> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables
            .classes
            .values()
            .any(|c| c.id != row.id && c.name == row.name)
        {
            return Err(duplicate("classes_name_key"));
        }
        Ok(replace(&mut tables.classes, row.id, row))
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<Option<SchoolClass>> {
        Ok(self.lock().classes.remove(&id))
    }

    // --- EXTRACURRICULARS ---

    async fn list_extracurriculars(
        &self,
        filter: &ContentFilter,
    ) -> AppResult<(Vec<Extracurricular>, i64)> {
        let mut rows: Vec<Extracurricular> = self
            .lock()
            .extracurriculars
            .values()
            .filter(|e| {
                matches(
                    filter.search.as_deref(),
                    &[
                        Some(e.name.as_str()),
                        e.description.as_deref(),
                        e.coach.as_deref(),
                    ],
                )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(rows, filter))
    }

    async fn find_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>> {
        Ok(self.lock().extracurriculars.get(&id).cloned())
    }

    async fn insert_extracurricular(&self, row: &Extracurricular) -> AppResult<Extracurricular> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables.extracurriculars.values().any(|e| e.name == row.name) {
            return Err(duplicate("extracurriculars_name_key"));
        }
        tables.extracurriculars.insert(row.id, row.clone());
        Ok(row.clone())
    }

    async fn update_extracurricular(
        &self,
        row: &Extracurricular,
    ) -> AppResult<Option<Extracurricular>> {
        self.check_content_write()?;
        let mut tables = self.lock();
        if tables
            .extracurriculars
            .values()
            .any(|e| e.id != row.id && e.name == row.name)
        {
            return Err(duplicate("extracurriculars_name_key"));
        }
        Ok(replace(&mut tables.extracurriculars, row.id, row))
    }

    async fn delete_extracurricular(&self, id: Uuid) -> AppResult<Option<Extracurricular>> {
        Ok(self.lock().extracurriculars.remove(&id))
    }

    // --- CONTACT ---

    async fn get_contact(&self) -> AppResult<Option<Contact>> {
        Ok(self.lock().contact.clone())
    }

    async fn upsert_contact(&self, contact: &Contact) -> AppResult<Contact> {
        let mut tables = self.lock();
        let mut saved = contact.clone();
        if let Some(existing) = &tables.contact {
            saved.id = existing.id;
        }
        tables.contact = Some(saved.clone());
        Ok(saved)
    }
}
