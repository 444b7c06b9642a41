use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::{AppError, AppResult},
    models::{GrantedPermission, User},
    repository::RepositoryState,
};

/// Name of the role that passes every permission check.
pub const SUPERADMIN_ROLE: &str = "superadmin";

/// Claims
///
/// Payload of every access token. Signed with HS256 using `AppConfig::jwt_secret`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    /// Expiration Time (exp): seconds since the epoch. Always validated.
    pub exp: usize,
    /// Issued At (iat)
    pub iat: usize,
}

/// issue_token
///
/// Signs a token for `user_id` valid for `ttl_seconds`. Returns the token and its
/// lifetime so the login response can report `expires_in`.
pub fn issue_token(user_id: Uuid, secret: &str, ttl_seconds: u64) -> AppResult<(String, u64)> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + ttl_seconds as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;

    Ok((token, ttl_seconds))
}

/// verify_token
///
/// Decodes and validates a token. Any failure (bad signature, malformed, expired)
/// collapses into `Unauthorized`.
pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected access token");
        AppError::Unauthorized
    })
}

/// Hashes a password into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

/// True when `password` matches the stored PHC hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Verified against when a login names no account, so that path also costs one argon2
/// run.
static UNKNOWN_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-account-placeholder").ok());

/// Spends one verification on a login whose email matched no account.
pub fn verify_unknown_account(password: &str) {
    if let Some(hash) = UNKNOWN_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the account, its role name and
/// every permission reachable through that role.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub permissions: Vec<GrantedPermission>,
}

impl AuthUser {
    pub fn is_superadmin(&self) -> bool {
        self.role.as_deref() == Some(SUPERADMIN_ROLE)
    }

    /// Holds the named permission (e.g. `articles.create`).
    pub fn can(&self, permission: &str) -> bool {
        self.is_superadmin() || self.permissions.iter().any(|p| p.name == permission)
    }

    /// Holds at least one permission of the group (e.g. any `articles.*`).
    pub fn can_any_in_group(&self, group: &str) -> bool {
        self.is_superadmin() || self.permissions.iter().any(|p| p.group_name == group)
    }

    pub fn require(&self, permission: &str) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, permission, "permission denied");
            Err(AppError::Forbidden)
        }
    }

    pub fn require_group(&self, group: &str) -> AppResult<()> {
        if self.can_any_in_group(group) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, group, "permission denied");
            Err(AppError::Forbidden)
        }
    }

    /// Builds the identity for an already-loaded, active user.
    pub async fn load(repo: &RepositoryState, user: User) -> AppResult<Self> {
        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        let role = match user.role_id {
            Some(role_id) => repo.find_role(role_id).await?.map(|r| r.name),
            None => None,
        };
        let permissions = repo.granted_permissions(user.id).await?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
            permissions,
        })
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user
///    authenticates as that user.
/// 2. Otherwise a `Bearer` token is required and validated (exp enforced).
/// 3. The user is re-read from the repository, so deleted or deactivated accounts lose
///    access immediately even with an unexpired token.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| Uuid::parse_str(value).ok());

            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.find_user(user_id).await? {
                    return AuthUser::load(&repo, user).await;
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(token, &config.jwt_secret)?;

        let user = repo
            .find_user(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        AuthUser::load(&repo, user).await
    }
}

/// catalog
///
/// Every permission the portal knows about, as `<group>.<action>`. The seeder creates
/// these under the `portal` system and grants them all to `superadmin`.
pub mod catalog {
    pub const SYSTEM: &str = "portal";

    const CRUD: &[&str] = &["view", "create", "update", "delete"];

    pub const GROUPS: &[(&str, &[&str])] = &[
        ("users", CRUD),
        ("roles", CRUD),
        ("permissions", CRUD),
        ("systems", CRUD),
        ("announcements", CRUD),
        ("articles", CRUD),
        ("galleries", CRUD),
        ("classes", CRUD),
        ("extracurriculars", CRUD),
        ("contact", &["update"]),
    ];

    /// `(permission name, group)` pairs in catalog order.
    pub fn all() -> impl Iterator<Item = (String, &'static str)> {
        GROUPS.iter().flat_map(|(group, actions)| {
            actions
                .iter()
                .map(move |action| (format!("{}.{}", group, action), *group))
        })
    }
}
