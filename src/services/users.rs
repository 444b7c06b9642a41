use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{check_password, is_valid_email, required};
use crate::AppState;
use crate::auth::{AuthUser, hash_password};
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User, UserResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

async fn role_of(state: &AppState, user: &User) -> AppResult<Option<Role>> {
    match user.role_id {
        Some(role_id) => state.repo.find_role(role_id).await,
        None => Ok(None),
    }
}

async fn check_role_exists(
    state: &AppState,
    role_id: Option<Uuid>,
    errors: &mut ValidationErrors,
) -> AppResult<()> {
    if let Some(role_id) = role_id {
        if state.repo.find_role(role_id).await?.is_none() {
            errors.add("role_id", "does not exist");
        }
    }
    Ok(())
}

pub async fn list(state: &AppState, query: &ListQuery) -> AppResult<Page<UserResponse>> {
    let pagination = query.pagination();
    let filter = ContentFilter::new(query.search_term(), pagination);
    let (users, total) = state.repo.list_users(&filter).await?;

    let roles: HashMap<Uuid, Role> = state
        .repo
        .list_roles()
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    Ok(Page::new(users, pagination, total).map(|user| {
        let role = user.role_id.and_then(|id| roles.get(&id));
        UserResponse::from_user(user, role)
    }))
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<UserResponse> {
    let user = state
        .repo
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let role = role_of(state, &user).await?;
    Ok(UserResponse::from_user(user, role.as_ref()))
}

pub async fn create(state: &AppState, req: CreateUserRequest) -> AppResult<UserResponse> {
    let mut errors = ValidationErrors::new();
    let name = required(Some(&req.name), "name", &mut errors);
    let email = required(Some(&req.email), "email", &mut errors);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            errors.add("email", "must be a valid email address");
        }
    }
    check_password(&req.password, "password", &mut errors);
    check_role_exists(state, req.role_id, &mut errors).await?;
    errors.into_result()?;

    let (name, email) = (name.unwrap_or_default(), email.unwrap_or_default());

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email is already taken".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash: hash_password(&req.password)?,
        role_id: req.role_id,
        is_active: req.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let user = state.repo.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "user created");

    let role = role_of(state, &user).await?;
    Ok(UserResponse::from_user(user, role.as_ref()))
}

pub async fn update(state: &AppState, id: Uuid, req: UpdateUserRequest) -> AppResult<UserResponse> {
    let mut user = state
        .repo
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let mut errors = ValidationErrors::new();
    let name = req
        .name
        .as_deref()
        .and_then(|n| required(Some(n), "name", &mut errors));
    let email = req
        .email
        .as_deref()
        .and_then(|e| required(Some(e), "email", &mut errors));
    if let Some(email) = &email {
        if !is_valid_email(email) {
            errors.add("email", "must be a valid email address");
        }
    }
    if let Some(password) = &req.password {
        check_password(password, "password", &mut errors);
    }
    check_role_exists(state, req.role_id.flatten(), &mut errors).await?;
    errors.into_result()?;

    if let Some(email) = email {
        if let Some(other) = state.repo.find_user_by_email(&email).await? {
            if other.id != id {
                return Err(AppError::Conflict("email is already taken".to_string()));
            }
        }
        user.email = email;
    }
    if let Some(name) = name {
        user.name = name;
    }
    if let Some(password) = &req.password {
        user.password_hash = hash_password(password)?;
    }
    if let Some(role_id) = req.role_id {
        user.role_id = role_id;
    }
    if let Some(is_active) = req.is_active {
        user.is_active = is_active;
    }
    user.updated_at = Utc::now();

    let user = state
        .repo
        .update_user(&user)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    tracing::info!(user_id = %user.id, "user updated");

    let role = role_of(state, &user).await?;
    Ok(UserResponse::from_user(user, role.as_ref()))
}

pub async fn delete(state: &AppState, actor: &AuthUser, id: Uuid) -> AppResult<()> {
    if actor.id == id {
        return Err(AppError::Conflict(
            "you cannot delete your own account".to_string(),
        ));
    }

    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound("user"));
    }

    tracing::info!(user_id = %id, deleted_by = %actor.id, "user deleted");
    Ok(())
}
