use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use super::{optional, required};
use crate::AppState;
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{CreateRoleRequest, Role, RoleDetail, UpdateRoleRequest};

/// Deduplicates the ids and checks each one names an existing permission.
async fn resolve_permission_ids(state: &AppState, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    let unique: BTreeSet<Uuid> = ids.iter().copied().collect();
    for id in &unique {
        if state.repo.find_permission(*id).await?.is_none() {
            return Err(AppError::field(
                "permission_ids",
                format!("permission {} does not exist", id),
            ));
        }
    }
    Ok(unique.into_iter().collect())
}

async fn detail(state: &AppState, role: Role) -> AppResult<RoleDetail> {
    let permissions = state.repo.role_permissions(role.id).await?;
    Ok(RoleDetail::new(role, permissions))
}

pub async fn list(state: &AppState) -> AppResult<Vec<Role>> {
    state.repo.list_roles().await
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<RoleDetail> {
    let role = state
        .repo
        .find_role(id)
        .await?
        .ok_or(AppError::NotFound("role"))?;
    detail(state, role).await
}

pub async fn create(state: &AppState, req: CreateRoleRequest) -> AppResult<RoleDetail> {
    let mut errors = ValidationErrors::new();
    let name = required(Some(&req.name), "name", &mut errors);
    errors.into_result()?;
    let name = name.unwrap_or_default();

    if state.repo.find_role_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(format!("role '{}' already exists", name)));
    }
    let permission_ids = resolve_permission_ids(state, &req.permission_ids).await?;

    let now = Utc::now();
    let role = state
        .repo
        .insert_role(&Role {
            id: Uuid::new_v4(),
            name,
            description: optional(req.description),
            created_at: now,
            updated_at: now,
        })
        .await?;

    if !permission_ids.is_empty() {
        state
            .repo
            .set_role_permissions(role.id, &permission_ids)
            .await?;
    }

    tracing::info!(role_id = %role.id, name = %role.name, permissions = permission_ids.len(), "role created");
    detail(state, role).await
}

pub async fn update(state: &AppState, id: Uuid, req: UpdateRoleRequest) -> AppResult<RoleDetail> {
    let mut role = state
        .repo
        .find_role(id)
        .await?
        .ok_or(AppError::NotFound("role"))?;

    if let Some(name) = req.name.as_deref() {
        let mut errors = ValidationErrors::new();
        let name = required(Some(name), "name", &mut errors);
        errors.into_result()?;
        let name = name.unwrap_or_default();

        if let Some(other) = state.repo.find_role_by_name(&name).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!("role '{}' already exists", name)));
            }
        }
        role.name = name;
    }
    if req.description.is_some() {
        role.description = optional(req.description);
    }
    role.updated_at = Utc::now();

    let role = state
        .repo
        .update_role(&role)
        .await?
        .ok_or(AppError::NotFound("role"))?;
    tracing::info!(role_id = %role.id, "role updated");
    detail(state, role).await
}

/// Replaces the role's whole permission set.
pub async fn sync_permissions(
    state: &AppState,
    id: Uuid,
    permission_ids: &[Uuid],
) -> AppResult<RoleDetail> {
    let role = state
        .repo
        .find_role(id)
        .await?
        .ok_or(AppError::NotFound("role"))?;

    let permission_ids = resolve_permission_ids(state, permission_ids).await?;
    state
        .repo
        .set_role_permissions(role.id, &permission_ids)
        .await?;

    tracing::info!(role_id = %role.id, permissions = permission_ids.len(), "role permissions synced");
    detail(state, role).await
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    if state.repo.find_role(id).await?.is_none() {
        return Err(AppError::NotFound("role"));
    }

    let assigned = state.repo.count_users_with_role(id).await?;
    if assigned > 0 {
        return Err(AppError::Conflict(format!(
            "role is still assigned to {} user(s)",
            assigned
        )));
    }

    if !state.repo.delete_role(id).await? {
        return Err(AppError::NotFound("role"));
    }
    tracing::info!(role_id = %id, "role deleted");
    Ok(())
}
