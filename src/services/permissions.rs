use chrono::Utc;
use uuid::Uuid;

use super::{optional, required};
use crate::AppState;
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{CreatePermissionRequest, Permission, UpdatePermissionRequest};

async fn check_system(state: &AppState, system_id: Uuid, errors: &mut ValidationErrors) -> AppResult<()> {
    if state.repo.find_system(system_id).await?.is_none() {
        errors.add("system_id", "does not exist");
    }
    Ok(())
}

async fn check_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    match state.repo.find_permission_by_name(name).await? {
        Some(other) if Some(other.id) != except => Err(AppError::Conflict(format!(
            "permission '{}' already exists",
            name
        ))),
        _ => Ok(()),
    }
}

pub async fn list(state: &AppState, system_id: Option<Uuid>) -> AppResult<Vec<Permission>> {
    state.repo.list_permissions(system_id).await
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<Permission> {
    state
        .repo
        .find_permission(id)
        .await?
        .ok_or(AppError::NotFound("permission"))
}

pub async fn create(state: &AppState, req: CreatePermissionRequest) -> AppResult<Permission> {
    let mut errors = ValidationErrors::new();
    let name = required(Some(&req.name), "name", &mut errors);
    let group_name = required(Some(&req.group_name), "group_name", &mut errors);
    check_system(state, req.system_id, &mut errors).await?;
    errors.into_result()?;

    let name = name.unwrap_or_default();
    check_name_free(state, &name, None).await?;

    let now = Utc::now();
    let permission = state
        .repo
        .insert_permission(&Permission {
            id: Uuid::new_v4(),
            system_id: req.system_id,
            name,
            group_name: group_name.unwrap_or_default(),
            description: optional(req.description),
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!(permission_id = %permission.id, name = %permission.name, "permission created");
    Ok(permission)
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    req: UpdatePermissionRequest,
) -> AppResult<Permission> {
    let mut permission = get(state, id).await?;

    let mut errors = ValidationErrors::new();
    let name = req
        .name
        .as_deref()
        .and_then(|n| required(Some(n), "name", &mut errors));
    let group_name = req
        .group_name
        .as_deref()
        .and_then(|g| required(Some(g), "group_name", &mut errors));
    if let Some(system_id) = req.system_id {
        check_system(state, system_id, &mut errors).await?;
    }
    errors.into_result()?;

    if let Some(name) = name {
        check_name_free(state, &name, Some(id)).await?;
        permission.name = name;
    }
    if let Some(group_name) = group_name {
        permission.group_name = group_name;
    }
    if let Some(system_id) = req.system_id {
        permission.system_id = system_id;
    }
    if req.description.is_some() {
        permission.description = optional(req.description);
    }
    permission.updated_at = Utc::now();

    let permission = state
        .repo
        .update_permission(&permission)
        .await?
        .ok_or(AppError::NotFound("permission"))?;
    tracing::info!(permission_id = %permission.id, "permission updated");
    Ok(permission)
}

/// Role assignments of the permission go with it.
pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.repo.delete_permission(id).await? {
        return Err(AppError::NotFound("permission"));
    }
    tracing::info!(permission_id = %id, "permission deleted");
    Ok(())
}
