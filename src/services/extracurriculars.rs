use chrono::Utc;
use uuid::Uuid;

use super::media;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Extracurricular, ExtracurricularForm, ExtracurricularResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

const FOLDER: &str = "extracurriculars";

pub async fn list(
    state: &AppState,
    query: &ListQuery,
) -> AppResult<Page<ExtracurricularResponse>> {
    let pagination = query.pagination();
    let filter = ContentFilter::new(query.search_term(), pagination);
    let (rows, total) = state.repo.list_extracurriculars(&filter).await?;
    Ok(Page::new(rows, pagination, total).map(|row| row.into_response(state.storage.as_ref())))
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<ExtracurricularResponse> {
    let row = state
        .repo
        .find_extracurricular(id)
        .await?
        .ok_or(AppError::NotFound("extracurricular"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn create(
    state: &AppState,
    form: ExtracurricularForm,
) -> AppResult<ExtracurricularResponse> {
    let Some(name) = form.name else {
        return Err(AppError::field("name", "is required"));
    };

    let image_key = media::store_optional(state, FOLDER, "image", form.image).await?;

    let now = Utc::now();
    let row = Extracurricular {
        id: Uuid::new_v4(),
        name,
        description: form.description.flatten(),
        coach: form.coach.flatten(),
        schedule: form.schedule.flatten(),
        image_key: image_key.clone(),
        created_at: now,
        updated_at: now,
    };

    let result = state.repo.insert_extracurricular(&row).await;
    let row = media::settle(state.storage.as_ref(), result, image_key.as_deref()).await?;

    tracing::info!(extracurricular_id = %row.id, name = %row.name, "extracurricular created");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    form: ExtracurricularForm,
) -> AppResult<ExtracurricularResponse> {
    let mut row = state
        .repo
        .find_extracurricular(id)
        .await?
        .ok_or(AppError::NotFound("extracurricular"))?;

    let fresh = media::store_optional(state, FOLDER, "image", form.image).await?;
    let (image_key, obsolete) = media::next_key(
        row.image_key.take(),
        fresh.clone(),
        form.remove_image.unwrap_or(false),
    );

    if let Some(name) = form.name {
        row.name = name;
    }
    if let Some(description) = form.description {
        row.description = description;
    }
    if let Some(coach) = form.coach {
        row.coach = coach;
    }
    if let Some(schedule) = form.schedule {
        row.schedule = schedule;
    }
    row.image_key = image_key;
    row.updated_at = Utc::now();

    let result = state
        .repo
        .update_extracurricular(&row)
        .await
        .and_then(|saved| saved.ok_or(AppError::NotFound("extracurricular")));
    let row = media::settle(state.storage.as_ref(), result, fresh.as_deref()).await?;

    if let Some(key) = obsolete {
        media::discard(state.storage.as_ref(), &key).await;
    }

    tracing::info!(extracurricular_id = %row.id, "extracurricular updated");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    let row = state
        .repo
        .delete_extracurricular(id)
        .await?
        .ok_or(AppError::NotFound("extracurricular"))?;

    if let Some(key) = &row.image_key {
        media::discard(state.storage.as_ref(), key).await;
    }

    tracing::info!(extracurricular_id = %id, "extracurricular deleted");
    Ok(())
}
