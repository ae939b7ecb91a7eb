//! Domain service for cook listings, profiles and admin user management.

use serde::Serialize;
use thiserror::Error;

use crate::models::recipe::Recipe;
use crate::models::user::User;

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i64),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A user together with the recipes they own.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub recipes: Vec<Recipe>,
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Users owning at least one recipe, for the public cook listing.
    async fn list_cooks(&self) -> Result<Vec<User>, UserError>;

    /// A single cook with their recipes.
    async fn get_cook(&self, id: i64) -> Result<Profile, UserError>;

    /// The authenticated user's own profile with their recipes.
    async fn profile(&self, user_id: i64) -> Result<Profile, UserError>;

    /// Stores an uploaded profile photo and records its filename.
    /// Returns the sanitized filename.
    async fn set_profile_photo(
        &self,
        user_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UserError>;

    /// Clears the profile photo field and deletes the file.
    async fn remove_profile_photo(&self, user_id: i64) -> Result<(), UserError>;

    /// All users, for the admin listing.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Deletes a user with the full cascade: owned recipes, their photo
    /// files and rows, the credentials, and the user row.
    async fn delete_user(&self, user_id: i64) -> Result<(), UserError>;
}
