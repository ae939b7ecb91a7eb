use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::ingredients;
use crate::models::ingredient::{Ingredient, NewIngredient};

pub struct IngredientRepository {
    conn: DatabaseConnection,
}

impl IngredientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, new_ingredient: NewIngredient) -> Result<Ingredient> {
        let active = ingredients::ActiveModel {
            name: Set(new_ingredient.name),
            quantity: Set(new_ingredient.quantity),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert ingredient")?;

        Ok(Ingredient::from(model))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Ingredient>> {
        let row = ingredients::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query ingredient by ID")?;

        Ok(row.map(Ingredient::from))
    }

    pub async fn list_all(&self) -> Result<Vec<Ingredient>> {
        let rows = ingredients::Entity::find()
            .order_by_asc(ingredients::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list ingredients")?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = ingredients::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete ingredient")?;

        Ok(result.rows_affected > 0)
    }
}
