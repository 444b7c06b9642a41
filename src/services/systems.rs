use chrono::Utc;
use uuid::Uuid;

use super::{optional, required};
use crate::AppState;
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{System, SystemRequest, UpdateSystemRequest};

async fn check_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    match state.repo.find_system_by_name(name).await? {
        Some(other) if Some(other.id) != except => Err(AppError::Conflict(format!(
            "system '{}' already exists",
            name
        ))),
        _ => Ok(()),
    }
}

pub async fn list(state: &AppState) -> AppResult<Vec<System>> {
    state.repo.list_systems().await
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<System> {
    state
        .repo
        .find_system(id)
        .await?
        .ok_or(AppError::NotFound("system"))
}

pub async fn create(state: &AppState, req: SystemRequest) -> AppResult<System> {
    let mut errors = ValidationErrors::new();
    let name = required(Some(&req.name), "name", &mut errors);
    errors.into_result()?;
    let name = name.unwrap_or_default();

    check_name_free(state, &name, None).await?;

    let now = Utc::now();
    let system = state
        .repo
        .insert_system(&System {
            id: Uuid::new_v4(),
            name,
            description: optional(req.description),
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!(system_id = %system.id, name = %system.name, "system created");
    Ok(system)
}

pub async fn update(state: &AppState, id: Uuid, req: UpdateSystemRequest) -> AppResult<System> {
    let mut system = get(state, id).await?;

    if let Some(name) = req.name.as_deref() {
        let mut errors = ValidationErrors::new();
        let name = required(Some(name), "name", &mut errors);
        errors.into_result()?;
        let name = name.unwrap_or_default();

        check_name_free(state, &name, Some(id)).await?;
        system.name = name;
    }
    if req.description.is_some() {
        system.description = optional(req.description);
    }
    system.updated_at = Utc::now();

    let system = state
        .repo
        .update_system(&system)
        .await?
        .ok_or(AppError::NotFound("system"))?;
    tracing::info!(system_id = %system.id, "system updated");
    Ok(system)
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    get(state, id).await?;

    let owned = state.repo.list_permissions(Some(id)).await?.len();
    if owned > 0 {
        return Err(AppError::Conflict(format!(
            "system still owns {} permission(s)",
            owned
        )));
    }

    if !state.repo.delete_system(id).await? {
        return Err(AppError::NotFound("system"));
    }
    tracing::info!(system_id = %id, "system deleted");
    Ok(())
}
