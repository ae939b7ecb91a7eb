//! Domain service for recipe CRUD, photos and ingredient management.

use thiserror::Error;

use crate::models::ingredient::{Ingredient, NewIngredient};
use crate::models::recipe::{NewRecipe, Recipe};
use crate::services::auth_service::AuthContext;

/// Errors specific to recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe {0} not found")]
    NotFound(i64),

    #[error("Ingredient {0} not found in recipe")]
    IngredientNotFound(i64),

    #[error("Photo '{0}' not found")]
    PhotoNotFound(String),

    #[error("User {0} not found")]
    OwnerNotFound(i64),

    #[error("Not the owner of recipe {0}")]
    NotOwner(i64),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Fields a recipe update may overwrite. The owner stays fixed.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub name: String,
    pub description: String,
}

/// Domain service trait for recipes.
///
/// Mutations take the requesting [`AuthContext`]; they succeed only when
/// the principal owns the recipe or holds the admin role.
#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    /// Creates a recipe owned by the requesting principal.
    async fn create(&self, ctx: &AuthContext, new_recipe: NewRecipe) -> Result<Recipe, RecipeError>;

    /// Creates a recipe on behalf of an arbitrary existing user.
    /// Reachable only through the admin routes.
    async fn create_for_user(
        &self,
        owner_id: i64,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, RecipeError>;

    async fn get(&self, id: i64) -> Result<Recipe, RecipeError>;

    async fn list(&self) -> Result<Vec<Recipe>, RecipeError>;

    /// Re-fetches the recipe and overwrites name and description.
    async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        update: RecipeUpdate,
    ) -> Result<Recipe, RecipeError>;

    /// Deletes the recipe, its photo files on disk, and its rows.
    async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<(), RecipeError>;

    /// Stores an uploaded photo and appends it to the recipe's photo list.
    /// Returns the sanitized filename.
    async fn add_photo(
        &self,
        ctx: &AuthContext,
        id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RecipeError>;

    /// Removes exactly the named photo entry and its file.
    async fn remove_photo(
        &self,
        ctx: &AuthContext,
        id: i64,
        file_name: &str,
    ) -> Result<(), RecipeError>;

    /// Creates an ingredient row and links it to the recipe.
    async fn add_ingredient(
        &self,
        ctx: &AuthContext,
        id: i64,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, RecipeError>;

    /// Unlinks the ingredient from the recipe. The ingredient row is
    /// deleted only when no other recipe still references it.
    async fn remove_ingredient(
        &self,
        ctx: &AuthContext,
        id: i64,
        ingredient_id: i64,
    ) -> Result<(), RecipeError>;

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, RecipeError>;
}
