//! Idempotent bootstrap of the access-control catalog and the first administrator.

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{SUPERADMIN_ROLE, catalog, hash_password};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::models::{Permission, Role, System, User};
use crate::repository::Repository;

/// run
///
/// Ensures the `portal` system, every catalog permission and the `superadmin` role
/// (holding all of them) exist. When `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set and no
/// account uses that email yet, the initial superadmin user is created. Safe to call on
/// every start.
pub async fn run(repo: &dyn Repository, config: &AppConfig) -> AppResult<()> {
    let now = Utc::now();

    let system = match repo.find_system_by_name(catalog::SYSTEM).await? {
        Some(system) => system,
        None => {
            let system = repo
                .insert_system(&System {
                    id: Uuid::new_v4(),
                    name: catalog::SYSTEM.to_string(),
                    description: Some("School portal".to_string()),
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            tracing::info!(system = %system.name, "seeded system");
            system
        }
    };

    let mut permission_ids = Vec::new();
    let mut created = 0;
    for (name, group) in catalog::all() {
        let permission = match repo.find_permission_by_name(&name).await? {
            Some(permission) => permission,
            None => {
                created += 1;
                repo.insert_permission(&Permission {
                    id: Uuid::new_v4(),
                    system_id: system.id,
                    name,
                    group_name: group.to_string(),
                    description: None,
                    created_at: now,
                    updated_at: now,
                })
                .await?
            }
        };
        permission_ids.push(permission.id);
    }
    if created > 0 {
        tracing::info!(count = created, "seeded permissions");
    }

    let role = match repo.find_role_by_name(SUPERADMIN_ROLE).await? {
        Some(role) => role,
        None => {
            let role = repo
                .insert_role(&Role {
                    id: Uuid::new_v4(),
                    name: SUPERADMIN_ROLE.to_string(),
                    description: Some("Full access to every system".to_string()),
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            tracing::info!(role = %role.name, "seeded role");
            role
        }
    };

    // Keep whatever else the role was given; just make sure the catalog is covered.
    let mut granted: Vec<Uuid> = repo
        .role_permissions(role.id)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    let missing: Vec<Uuid> = permission_ids
        .into_iter()
        .filter(|id| !granted.contains(id))
        .collect();
    if !missing.is_empty() {
        granted.extend(missing);
        repo.set_role_permissions(role.id, &granted).await?;
    }

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if repo.find_user_by_email(email).await?.is_none() {
            let user = repo
                .insert_user(&User {
                    id: Uuid::new_v4(),
                    name: config.admin_name.clone(),
                    email: email.clone(),
                    password_hash: hash_password(password)?,
                    role_id: Some(role.id),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            tracing::info!(user_id = %user.id, email = %user.email, "seeded administrator");
        }
    }

    Ok(())
}
