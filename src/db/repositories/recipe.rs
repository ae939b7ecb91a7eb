use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{ingredients, recipe_ingredients, recipe_photos, recipes};
use crate::models::ingredient::Ingredient;
use crate::models::recipe::{NewRecipe, Recipe};

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_recipe(
        model: recipes::Model,
        photos: Vec<recipe_photos::Model>,
        ingredients: Vec<ingredients::Model>,
    ) -> Recipe {
        Recipe {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            user_id: model.user_id,
            created_at: model.created_at,
            photos: photos.into_iter().map(|p| p.file_name).collect(),
            ingredients: ingredients.into_iter().map(Ingredient::from).collect(),
        }
    }

    async fn load_details(&self, rows: Vec<recipes::Model>) -> Result<Vec<Recipe>> {
        let photos = rows
            .load_many(recipe_photos::Entity, &self.conn)
            .await
            .context("Failed to load recipe photos")?;

        let ingredients = rows
            .load_many_to_many(ingredients::Entity, recipe_ingredients::Entity, &self.conn)
            .await
            .context("Failed to load recipe ingredients")?;

        Ok(rows
            .into_iter()
            .zip(photos)
            .zip(ingredients)
            .map(|((model, photos), ingredients)| {
                Self::map_model_to_recipe(model, photos, ingredients)
            })
            .collect())
    }

    pub async fn insert(&self, new_recipe: NewRecipe, owner_id: i64) -> Result<Recipe> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = recipes::ActiveModel {
            name: Set(new_recipe.name),
            description: Set(new_recipe.description),
            category: Set(new_recipe.category),
            user_id: Set(owner_id),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert recipe")?;

        info!("Added recipe: {} (owner {})", model.name, owner_id);

        Ok(Self::map_model_to_recipe(model, Vec::new(), Vec::new()))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Recipe>> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query recipe by ID")?
        else {
            return Ok(None);
        };

        Ok(self.load_details(vec![model]).await?.pop())
    }

    pub async fn list_all(&self) -> Result<Vec<Recipe>> {
        let rows = recipes::Entity::find()
            .order_by_asc(recipes::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list recipes")?;

        self.load_details(rows).await
    }

    pub async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let rows = recipes::Entity::find()
            .filter(recipes::Column::UserId.eq(user_id))
            .order_by_asc(recipes::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list recipes by owner")?;

        self.load_details(rows).await
    }

    /// Overwrites name and description only. The owner stays fixed.
    pub async fn update_details(&self, id: i64, name: &str, description: &str) -> Result<bool> {
        let Some(model) = recipes::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: recipes::ActiveModel = model.into();
        active.name = Set(name.to_string());
        active.description = Set(description.to_string());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Deletes a recipe with its photo rows and ingredient links in one
    /// transaction. Ingredient rows themselves are left alone.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let txn = self.conn.begin().await?;

        recipe_photos::Entity::delete_many()
            .filter(recipe_photos::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        let result = recipes::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed recipe with ID: {}", id);
        }
        Ok(removed)
    }

    pub async fn add_photo(&self, recipe_id: i64, file_name: &str) -> Result<()> {
        let active = recipe_photos::ActiveModel {
            recipe_id: Set(recipe_id),
            file_name: Set(file_name.to_string()),
        };

        recipe_photos::Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    recipe_photos::Column::RecipeId,
                    recipe_photos::Column::FileName,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to insert recipe photo")?;

        Ok(())
    }

    pub async fn remove_photo(&self, recipe_id: i64, file_name: &str) -> Result<bool> {
        let result = recipe_photos::Entity::delete_many()
            .filter(recipe_photos::Column::RecipeId.eq(recipe_id))
            .filter(recipe_photos::Column::FileName.eq(file_name))
            .exec(&self.conn)
            .await
            .context("Failed to delete recipe photo")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_photos(&self, recipe_id: i64) -> Result<Vec<String>> {
        let rows = recipe_photos::Entity::find()
            .filter(recipe_photos::Column::RecipeId.eq(recipe_id))
            .all(&self.conn)
            .await
            .context("Failed to list recipe photos")?;

        Ok(rows.into_iter().map(|p| p.file_name).collect())
    }

    pub async fn link_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<()> {
        let active = recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
        };

        recipe_ingredients::Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    recipe_ingredients::Column::RecipeId,
                    recipe_ingredients::Column::IngredientId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to link ingredient")?;

        Ok(())
    }

    pub async fn unlink_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<bool> {
        let result = recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
            .exec(&self.conn)
            .await
            .context("Failed to unlink ingredient")?;

        Ok(result.rows_affected > 0)
    }

    /// How many recipes still reference an ingredient.
    pub async fn ingredient_usage_count(&self, ingredient_id: i64) -> Result<u64> {
        let count = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
            .count(&self.conn)
            .await
            .context("Failed to count ingredient references")?;

        Ok(count)
    }
}
