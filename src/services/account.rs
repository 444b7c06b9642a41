use std::collections::BTreeMap;

use super::{check_password, required};
use crate::AppState;
use crate::auth::{
    AuthUser, hash_password, issue_token, verify_password, verify_unknown_account,
};
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MeResponse, PermissionGroup,
    SystemPermissions, UserResponse,
};

/// login
///
/// Exchanges credentials for an access token. Every credential failure, including a
/// deactivated account, answers the same 401.
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<LoginResponse> {
    let mut errors = ValidationErrors::new();
    let email = required(Some(&req.email), "email", &mut errors);
    if req.password.is_empty() {
        errors.add("password", "is required");
    }
    errors.into_result()?;
    let email = email.unwrap_or_default();

    let Some(user) = state.repo.find_user_by_email(&email).await? else {
        verify_unknown_account(&req.password);
        tracing::info!(email = %email, "login failed: unknown email");
        return Err(AppError::Unauthorized);
    };

    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        tracing::info!(user_id = %user.id, "login failed: account inactive");
        return Err(AppError::Unauthorized);
    }

    let (access_token, expires_in) = issue_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_ttl_seconds,
    )?;

    let role = match user.role_id {
        Some(role_id) => state.repo.find_role(role_id).await?,
        None => None,
    };

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in,
        user: UserResponse::from_user(user, role.as_ref()),
    })
}

/// The caller's profile with permissions grouped system → group → names.
pub fn me(user: &AuthUser) -> MeResponse {
    let mut systems: BTreeMap<&str, BTreeMap<&str, Vec<String>>> = BTreeMap::new();
    for permission in &user.permissions {
        systems
            .entry(permission.system.as_str())
            .or_default()
            .entry(permission.group_name.as_str())
            .or_default()
            .push(permission.name.clone());
    }

    MeResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        is_superadmin: user.is_superadmin(),
        systems: systems
            .into_iter()
            .map(|(system, groups)| SystemPermissions {
                system: system.to_string(),
                groups: groups
                    .into_iter()
                    .map(|(group, mut permissions)| {
                        permissions.sort();
                        PermissionGroup {
                            group: group.to_string(),
                            permissions,
                        }
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    req: ChangePasswordRequest,
) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    if req.current_password.is_empty() {
        errors.add("current_password", "is required");
    }
    check_password(&req.new_password, "new_password", &mut errors);
    errors.into_result()?;

    let mut account = state
        .repo
        .find_user(user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.current_password, &account.password_hash) {
        tracing::info!(user_id = %user.id, "password change rejected: wrong current password");
        return Err(AppError::Unauthorized);
    }

    account.password_hash = hash_password(&req.new_password)?;
    account.updated_at = chrono::Utc::now();
    state
        .repo
        .update_user(&account)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrantedPermission;
    use uuid::Uuid;

    fn granted(system: &str, group: &str, name: &str) -> GrantedPermission {
        GrantedPermission {
            name: name.into(),
            group_name: group.into(),
            system: system.into(),
        }
    }

    #[test]
    fn me_groups_permissions() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            name: "Editor".into(),
            email: "editor@school.test".into(),
            role: Some("editor".into()),
            permissions: vec![
                granted("portal", "articles", "articles.update"),
                granted("portal", "articles", "articles.create"),
                granted("portal", "galleries", "galleries.view"),
            ],
        };

        let me = me(&user);
        assert!(!me.is_superadmin);
        assert_eq!(me.systems.len(), 1);
        assert_eq!(me.systems[0].system, "portal");
        assert_eq!(
            me.systems[0].groups[0],
            PermissionGroup {
                group: "articles".into(),
                permissions: vec!["articles.create".into(), "articles.update".into()],
            }
        );
        assert_eq!(me.systems[0].groups[1].group, "galleries");
    }
}
