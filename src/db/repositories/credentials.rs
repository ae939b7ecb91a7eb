use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::credentials;
use crate::models::user::User;

/// Credentials data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub user_id: i64,
}

impl From<credentials::Model> for Credentials {
    fn from(model: credentials::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            user_id: model.user_id,
        }
    }
}

pub struct CredentialsRepository {
    conn: DatabaseConnection,
}

impl CredentialsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Credentials>> {
        let row = credentials::Entity::find()
            .filter(credentials::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query credentials by username")?;

        Ok(row.map(Credentials::from))
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// Credentials joined with the user row they belong to.
    pub async fn get_with_user(&self, username: &str) -> Result<Option<(Credentials, User)>> {
        let row = credentials::Entity::find()
            .filter(credentials::Column::Username.eq(username))
            .find_also_related(crate::entities::users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query credentials with user")?;

        Ok(row.and_then(|(cred, user)| user.map(|u| (Credentials::from(cred), User::from(u)))))
    }

    /// Inserts a credentials row, hashing the password in a blocking task.
    pub async fn insert(
        &self,
        username: &str,
        password: &str,
        role: &str,
        user_id: i64,
        security: Option<&SecurityConfig>,
    ) -> Result<Credentials> {
        let password = password.to_string();
        let security = security.cloned();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, security.as_ref()))
                .await
                .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = credentials::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            user_id: Set(user_id),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert credentials")?;

        Ok(Credentials::from(model))
    }

    /// Verify a password for a username.
    /// Note: this uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let row = credentials::Entity::find()
            .filter(credentials::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query credentials for password verification")?;

        let Some(row) = row else {
            return Ok(false);
        };

        let password_hash = row.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    pub async fn update_password(&self, username: &str, new_password: &str) -> Result<()> {
        let row = credentials::Entity::find()
            .filter(credentials::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query credentials for password update")?
            .ok_or_else(|| anyhow::anyhow!("Credentials not found: {username}"))?;

        let password = new_password.to_string();
        let new_hash = task::spawn_blocking(move || hash_password(&password, None))
            .await
            .context("Password hashing task panicked")??;

        let mut active: credentials::ActiveModel = row.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Credentials>> {
        let row = credentials::Entity::find()
            .filter(credentials::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query credentials by user ID")?;

        Ok(row.map(Credentials::from))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random password for OIDC-provisioned accounts (64 character
/// hex string). It is never shown to anyone; those accounts log in through
/// their provider.
#[must_use]
pub fn generate_random_password() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
