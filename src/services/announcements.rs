use chrono::Utc;
use uuid::Uuid;

use super::media;
use crate::AppState;
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{Announcement, AnnouncementForm, AnnouncementResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

const FOLDER: &str = "announcements";

/// Lists announcements newest first. Public callers only see published ones.
pub async fn list(
    state: &AppState,
    query: &ListQuery,
    published_only: bool,
) -> AppResult<Page<AnnouncementResponse>> {
    let pagination = query.pagination();
    let filter = ContentFilter::new(query.search_term(), pagination).published(published_only);
    let (rows, total) = state.repo.list_announcements(&filter).await?;
    Ok(Page::new(rows, pagination, total).map(|row| row.into_response(state.storage.as_ref())))
}

/// A draft is indistinguishable from a missing announcement for public callers.
pub async fn get(state: &AppState, id: Uuid, published_only: bool) -> AppResult<AnnouncementResponse> {
    let row = state
        .repo
        .find_announcement(id)
        .await?
        .filter(|row| row.is_published || !published_only)
        .ok_or(AppError::NotFound("announcement"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn create(
    state: &AppState,
    author: &AuthUser,
    form: AnnouncementForm,
) -> AppResult<AnnouncementResponse> {
    let image_key = media::store_optional(state, FOLDER, "image", form.image).await?;

    let now = Utc::now();
    let is_published = form.is_published.unwrap_or(false);
    let row = Announcement {
        id: Uuid::new_v4(),
        title: form.title.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
        image_key: image_key.clone(),
        is_published,
        published_at: is_published.then_some(now),
        author_id: Some(author.id),
        created_at: now,
        updated_at: now,
    };

    let result = state.repo.insert_announcement(&row).await;
    let row = media::settle(state.storage.as_ref(), result, image_key.as_deref()).await?;

    tracing::info!(announcement_id = %row.id, author_id = %author.id, "announcement created");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    form: AnnouncementForm,
) -> AppResult<AnnouncementResponse> {
    let mut row = state
        .repo
        .find_announcement(id)
        .await?
        .ok_or(AppError::NotFound("announcement"))?;

    let fresh = media::store_optional(state, FOLDER, "image", form.image).await?;
    let (image_key, obsolete) = media::next_key(
        row.image_key.take(),
        fresh.clone(),
        form.remove_image.unwrap_or(false),
    );

    let now = Utc::now();
    if let Some(title) = form.title {
        row.title = title;
    }
    if let Some(content) = form.content {
        row.content = content;
    }
    if let Some(is_published) = form.is_published {
        row.is_published = is_published;
    }
    // First publication stamps the date; later toggles keep it.
    if row.is_published && row.published_at.is_none() {
        row.published_at = Some(now);
    }
    row.image_key = image_key;
    row.updated_at = now;

    let result = state
        .repo
        .update_announcement(&row)
        .await
        .and_then(|saved| saved.ok_or(AppError::NotFound("announcement")));
    let row = media::settle(state.storage.as_ref(), result, fresh.as_deref()).await?;

    if let Some(key) = obsolete {
        media::discard(state.storage.as_ref(), &key).await;
    }

    tracing::info!(announcement_id = %row.id, "announcement updated");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    let row = state
        .repo
        .delete_announcement(id)
        .await?
        .ok_or(AppError::NotFound("announcement"))?;

    if let Some(key) = &row.image_key {
        media::discard(state.storage.as_ref(), key).await;
    }

    tracing::info!(announcement_id = %id, "announcement deleted");
    Ok(())
}
