use crate::entities::{admins, prelude::*, users};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Covers unknown account, inactive account, lockout and password
    /// mismatch alike, so responses never reveal which one happened.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Password hash error: {0}")]
    Hash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(UserRole::User),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "ADMIN",
            AdminRole::SuperAdmin => "SUPER_ADMIN",
            AdminRole::Moderator => "MODERATOR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(AdminRole::Admin),
            "SUPER_ADMIN" => Some(AdminRole::SuperAdmin),
            "MODERATOR" => Some(AdminRole::Moderator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPrincipal {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPrincipal {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
}

/// Normalized session principal. Exactly one variant is active per session;
/// the serialized form (tagged by `kind`) is the JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    User(UserPrincipal),
    Admin(AdminPrincipal),
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::User(p) => &p.id,
            Principal::Admin(p) => &p.id,
        }
    }

    pub fn role_str(&self) -> &'static str {
        match self {
            Principal::User(p) => p.role.as_str(),
            Principal::Admin(p) => p.role.as_str(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Principal::User(p) => p.is_active,
            Principal::Admin(p) => p.is_active,
        }
    }

    /// Whether this session may enter the admin back office. Admin sessions
    /// qualify with any back-office role; user sessions only with role ADMIN.
    pub fn has_admin_access(&self) -> bool {
        match self {
            Principal::User(p) => p.role == UserRole::Admin,
            Principal::Admin(_) => true,
        }
    }
}

/// Login credentials, discriminated explicitly by the caller. The two flows
/// use disjoint identifier spaces (email vs. username) and disjoint tables
/// and must never be conflated.
#[derive(Debug, Clone)]
pub enum Credentials {
    User { email: String, password: String },
    Admin { username: String, password: String },
}

#[async_trait]
pub trait CredentialAuthenticator {
    async fn authenticate(&self, identifier: &str, password: &str)
    -> Result<Principal, AuthError>;
}

/// End-user flow: email + password against the `users` table.
pub struct UserAuthenticator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserAuthenticator<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialAuthenticator for UserAuthenticator<'_> {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        verify_password(password, &user.password_hash)?;

        let mut active = user.clone().into_active_model();
        active.last_login_at = Set(Some(Utc::now()));
        active.update(self.db).await?;

        let role = UserRole::parse(&user.role).unwrap_or(UserRole::User);
        Ok(Principal::User(UserPrincipal {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            avatar: user.avatar,
            role,
            is_active: user.is_active,
        }))
    }
}

/// Back-office flow: username + password against the `admins` table, with
/// lockout enforcement. A future `locked_until` fails the login before the
/// password is ever checked.
pub struct AdminAuthenticator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminAuthenticator<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialAuthenticator for AdminAuthenticator<'_> {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let admin = Admins::find()
            .filter(admins::Column::Username.eq(username))
            .one(self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !admin.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(locked_until) = admin.locked_until {
            if locked_until > Utc::now() {
                tracing::warn!("🔒 Locked admin account attempted login: {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        }

        verify_password(password, &admin.password_hash)?;

        let mut active = admin.clone().into_active_model();
        active.login_attempts = Set(0);
        active.locked_until = Set(None);
        active.last_login_at = Set(Some(Utc::now()));
        active.update(self.db).await?;

        let role = AdminRole::parse(&admin.role).unwrap_or(AdminRole::Moderator);
        let permissions = admin
            .permissions
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Principal::Admin(AdminPrincipal {
            id: admin.id,
            email: admin.email,
            username: admin.username,
            full_name: admin.full_name,
            avatar: admin.avatar,
            role,
            permissions,
            is_active: admin.is_active,
        }))
    }
}

/// Resolve credentials through the matching authenticator.
pub async fn authenticate(
    db: &DatabaseConnection,
    credentials: Credentials,
) -> Result<Principal, AuthError> {
    match credentials {
        Credentials::User { email, password } => {
            UserAuthenticator::new(db).authenticate(&email, &password).await
        }
        Credentials::Admin { username, password } => {
            AdminAuthenticator::new(db)
                .authenticate(&username, &password)
                .await
        }
    }
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash =
        argon2::PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_kind_tags() {
        let user = Principal::User(UserPrincipal {
            id: "u1".into(),
            email: "a@b.c".into(),
            username: "a".into(),
            full_name: "A B".into(),
            avatar: None,
            role: UserRole::User,
            is_active: true,
        });
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["isActive"], true);

        let admin = Principal::Admin(AdminPrincipal {
            id: "a1".into(),
            email: "x@y.z".into(),
            username: "root".into(),
            full_name: "Root".into(),
            avatar: None,
            role: AdminRole::SuperAdmin,
            permissions: vec!["files:manage".into()],
            is_active: true,
        });
        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["kind"], "admin");
        assert_eq!(json["role"], "SUPER_ADMIN");
        assert_eq!(json["permissions"][0], "files:manage");
    }

    #[test]
    fn test_admin_access_rules() {
        let make_user = |role| {
            Principal::User(UserPrincipal {
                id: "u1".into(),
                email: "a@b.c".into(),
                username: "a".into(),
                full_name: "A".into(),
                avatar: None,
                role,
                is_active: true,
            })
        };
        assert!(!make_user(UserRole::User).has_admin_access());
        assert!(make_user(UserRole::Admin).has_admin_access());
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter3", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(UserRole::parse("SUPER_ADMIN"), None);
        assert_eq!(AdminRole::parse("USER"), None);
        assert_eq!(AdminRole::parse("MODERATOR"), Some(AdminRole::Moderator));
    }
}
