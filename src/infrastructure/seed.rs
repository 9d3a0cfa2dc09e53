use crate::entities::{admins, prelude::*};
use crate::services::auth_service::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::env;
use tracing::{info, warn};
use uuid::Uuid;

/// Seed a first back-office account when ADMIN_SEED_USERNAME /
/// ADMIN_SEED_PASSWORD are set and the username does not exist yet.
pub async fn seed_initial_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    let (Ok(username), Ok(password)) = (
        env::var("ADMIN_SEED_USERNAME"),
        env::var("ADMIN_SEED_PASSWORD"),
    ) else {
        return Ok(());
    };

    let exists = Admins::find()
        .filter(admins::Column::Username.eq(&username))
        .one(db)
        .await?;
    if exists.is_some() {
        return Ok(());
    }

    info!("🌱 Seeding initial admin account: {}", username);

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash seed password: {}", e);
            return Ok(());
        }
    };

    let admin = admins::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(username.clone()),
        email: Set(env::var("ADMIN_SEED_EMAIL").unwrap_or_else(|_| format!("{username}@localhost"))),
        full_name: Set("Administrator".to_string()),
        avatar: Set(None),
        role: Set("SUPER_ADMIN".to_string()),
        permissions: Set(serde_json::json!(["*"])),
        password_hash: Set(password_hash),
        is_active: Set(true),
        login_attempts: Set(0),
        locked_until: Set(None),
        last_login_at: Set(None),
        created_at: Set(chrono::Utc::now()),
    };
    admin.insert(db).await?;

    Ok(())
}
