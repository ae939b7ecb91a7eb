//! `SeaORM` implementation of the `RecipeService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::db::Store;
use crate::models::ingredient::{Ingredient, NewIngredient};
use crate::models::recipe::{NewRecipe, Recipe};
use crate::services::auth_service::AuthContext;
use crate::services::recipe_service::{RecipeError, RecipeService, RecipeUpdate};
use crate::services::upload::UploadStore;

pub struct SeaOrmRecipeService {
    store: Store,
    uploads: Arc<UploadStore>,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store, uploads: Arc<UploadStore>) -> Self {
        Self { store, uploads }
    }

    /// Fetches the recipe and checks the principal against its owner.
    async fn authorize(&self, ctx: &AuthContext, id: i64) -> Result<Recipe, RecipeError> {
        let recipe = self
            .store
            .get_recipe(id)
            .await?
            .ok_or(RecipeError::NotFound(id))?;

        if recipe.user_id != ctx.user_id && !ctx.role.is_admin() {
            return Err(RecipeError::NotOwner(id));
        }

        Ok(recipe)
    }

    fn validate(new_recipe: &NewRecipe) -> Result<(), RecipeError> {
        if new_recipe.name.trim().is_empty() {
            return Err(RecipeError::Validation("Recipe name is required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn create(&self, ctx: &AuthContext, new_recipe: NewRecipe) -> Result<Recipe, RecipeError> {
        Self::validate(&new_recipe)?;

        // Owner always comes from the auth context, never from the form.
        let recipe = self.store.insert_recipe(new_recipe, ctx.user_id).await?;

        Ok(recipe)
    }

    async fn create_for_user(
        &self,
        owner_id: i64,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, RecipeError> {
        Self::validate(&new_recipe)?;

        self.store
            .get_user(owner_id)
            .await?
            .ok_or(RecipeError::OwnerNotFound(owner_id))?;

        let recipe = self.store.insert_recipe(new_recipe, owner_id).await?;

        Ok(recipe)
    }

    async fn get(&self, id: i64) -> Result<Recipe, RecipeError> {
        self.store
            .get_recipe(id)
            .await?
            .ok_or(RecipeError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.store.list_recipes().await?)
    }

    async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        update: RecipeUpdate,
    ) -> Result<Recipe, RecipeError> {
        if update.name.trim().is_empty() {
            return Err(RecipeError::Validation("Recipe name is required".to_string()));
        }

        self.authorize(ctx, id).await?;

        self.store
            .update_recipe_details(id, &update.name, &update.description)
            .await?;

        self.get(id).await
    }

    async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<(), RecipeError> {
        let recipe = self.authorize(ctx, id).await?;

        // Files first, then rows. A failed file delete is logged and
        // skipped so the cascade still completes.
        for photo in &recipe.photos {
            if let Err(e) = self.uploads.delete(photo).await {
                warn!("Failed to delete photo file {}: {}", photo, e);
            }
        }

        if !self.store.delete_recipe(id).await? {
            return Err(RecipeError::NotFound(id));
        }

        Ok(())
    }

    async fn add_photo(
        &self,
        ctx: &AuthContext,
        id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RecipeError> {
        self.authorize(ctx, id).await?;

        let stored = self
            .uploads
            .save(file_name, &bytes)
            .await
            .map_err(|e| RecipeError::Validation(e.to_string()))?;

        self.store.add_recipe_photo(id, &stored).await?;

        Ok(stored)
    }

    async fn remove_photo(
        &self,
        ctx: &AuthContext,
        id: i64,
        file_name: &str,
    ) -> Result<(), RecipeError> {
        self.authorize(ctx, id).await?;

        if !self.store.remove_recipe_photo(id, file_name).await? {
            return Err(RecipeError::PhotoNotFound(file_name.to_string()));
        }

        self.uploads.delete(file_name).await?;

        Ok(())
    }

    async fn add_ingredient(
        &self,
        ctx: &AuthContext,
        id: i64,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, RecipeError> {
        if new_ingredient.name.trim().is_empty() {
            return Err(RecipeError::Validation(
                "Ingredient name is required".to_string(),
            ));
        }

        self.authorize(ctx, id).await?;

        let ingredient = self.store.insert_ingredient(new_ingredient).await?;
        self.store.link_ingredient(id, ingredient.id).await?;

        Ok(ingredient)
    }

    async fn remove_ingredient(
        &self,
        ctx: &AuthContext,
        id: i64,
        ingredient_id: i64,
    ) -> Result<(), RecipeError> {
        self.authorize(ctx, id).await?;

        if !self.store.unlink_ingredient(id, ingredient_id).await? {
            return Err(RecipeError::IngredientNotFound(ingredient_id));
        }

        // Recipe-scoped removal: the row goes away only once nothing
        // references it anymore.
        if self.store.ingredient_usage_count(ingredient_id).await? == 0 {
            self.store.delete_ingredient(ingredient_id).await?;
        }

        Ok(())
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, RecipeError> {
        Ok(self.store.list_ingredients().await?)
    }
}
