use chrono::Utc;
use uuid::Uuid;

use super::media;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{SchoolClass, SchoolClassForm, SchoolClassResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

const FOLDER: &str = "classes";

/// Ordered by grade level, then name.
pub async fn list(state: &AppState, query: &ListQuery) -> AppResult<Page<SchoolClassResponse>> {
    let pagination = query.pagination();
    let filter = ContentFilter::new(query.search_term(), pagination);
    let (rows, total) = state.repo.list_classes(&filter).await?;
    Ok(Page::new(rows, pagination, total).map(|row| row.into_response(state.storage.as_ref())))
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<SchoolClassResponse> {
    let row = state
        .repo
        .find_class(id)
        .await?
        .ok_or(AppError::NotFound("class"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn create(state: &AppState, form: SchoolClassForm) -> AppResult<SchoolClassResponse> {
    let image_key = media::store_optional(state, FOLDER, "image", form.image).await?;

    let now = Utc::now();
    let row = SchoolClass {
        id: Uuid::new_v4(),
        name: form.name.unwrap_or_default(),
        grade_level: form.grade_level.unwrap_or_default(),
        homeroom_teacher: form.homeroom_teacher.flatten(),
        description: form.description.flatten(),
        image_key: image_key.clone(),
        created_at: now,
        updated_at: now,
    };

    // Name uniqueness is enforced by the store and surfaces as 409.
    let result = state.repo.insert_class(&row).await;
    let row = media::settle(state.storage.as_ref(), result, image_key.as_deref()).await?;

    tracing::info!(class_id = %row.id, name = %row.name, "class created");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    form: SchoolClassForm,
) -> AppResult<SchoolClassResponse> {
    let mut row = state
        .repo
        .find_class(id)
        .await?
        .ok_or(AppError::NotFound("class"))?;

    let fresh = media::store_optional(state, FOLDER, "image", form.image).await?;
    let (image_key, obsolete) = media::next_key(
        row.image_key.take(),
        fresh.clone(),
        form.remove_image.unwrap_or(false),
    );

    if let Some(name) = form.name {
        row.name = name;
    }
    if let Some(grade_level) = form.grade_level {
        row.grade_level = grade_level;
    }
    if let Some(homeroom_teacher) = form.homeroom_teacher {
        row.homeroom_teacher = homeroom_teacher;
    }
    if let Some(description) = form.description {
        row.description = description;
    }
    row.image_key = image_key;
    row.updated_at = Utc::now();

    let result = state
        .repo
        .update_class(&row)
        .await
        .and_then(|saved| saved.ok_or(AppError::NotFound("class")));
    let row = media::settle(state.storage.as_ref(), result, fresh.as_deref()).await?;

    if let Some(key) = obsolete {
        media::discard(state.storage.as_ref(), &key).await;
    }

    tracing::info!(class_id = %row.id, "class updated");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    let row = state
        .repo
        .delete_class(id)
        .await?
        .ok_or(AppError::NotFound("class"))?;

    if let Some(key) = &row.image_key {
        media::discard(state.storage.as_ref(), key).await;
    }

    tracing::info!(class_id = %id, "class deleted");
    Ok(())
}
