use chrono::Utc;
use uuid::Uuid;

use super::media;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Gallery, GalleryForm, GalleryResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

const FOLDER: &str = "galleries";

pub async fn list(state: &AppState, query: &ListQuery) -> AppResult<Page<GalleryResponse>> {
    let pagination = query.pagination();
    let filter = ContentFilter::new(query.search_term(), pagination);
    let (rows, total) = state.repo.list_galleries(&filter).await?;
    Ok(Page::new(rows, pagination, total).map(|row| row.into_response(state.storage.as_ref())))
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<GalleryResponse> {
    let row = state
        .repo
        .find_gallery(id)
        .await?
        .ok_or(AppError::NotFound("gallery"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn create(state: &AppState, form: GalleryForm) -> AppResult<GalleryResponse> {
    let Some(image) = form.image else {
        return Err(AppError::field("image", "is required"));
    };
    let image_key = media::store_image(state, FOLDER, "image", image).await?;

    let now = Utc::now();
    let row = Gallery {
        id: Uuid::new_v4(),
        title: form.title.unwrap_or_default(),
        description: form.description.flatten(),
        image_key: image_key.clone(),
        created_at: now,
        updated_at: now,
    };

    let result = state.repo.insert_gallery(&row).await;
    let row = media::settle(state.storage.as_ref(), result, Some(&image_key)).await?;

    tracing::info!(gallery_id = %row.id, "gallery created");
    Ok(row.into_response(state.storage.as_ref()))
}

/// The image can be replaced but never removed.
pub async fn update(state: &AppState, id: Uuid, form: GalleryForm) -> AppResult<GalleryResponse> {
    let mut row = state
        .repo
        .find_gallery(id)
        .await?
        .ok_or(AppError::NotFound("gallery"))?;

    let fresh = media::store_optional(state, FOLDER, "image", form.image).await?;
    let obsolete = fresh
        .as_ref()
        .map(|key| std::mem::replace(&mut row.image_key, key.clone()));

    if let Some(title) = form.title {
        row.title = title;
    }
    if let Some(description) = form.description {
        row.description = description;
    }
    row.updated_at = Utc::now();

    let result = state
        .repo
        .update_gallery(&row)
        .await
        .and_then(|saved| saved.ok_or(AppError::NotFound("gallery")));
    let row = media::settle(state.storage.as_ref(), result, fresh.as_deref()).await?;

    if let Some(key) = obsolete {
        media::discard(state.storage.as_ref(), &key).await;
    }

    tracing::info!(gallery_id = %row.id, "gallery updated");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    let row = state
        .repo
        .delete_gallery(id)
        .await?
        .ok_or(AppError::NotFound("gallery"))?;

    media::discard(state.storage.as_ref(), &row.image_key).await;

    tracing::info!(gallery_id = %id, "gallery deleted");
    Ok(())
}
