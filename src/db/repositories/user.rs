use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{credentials, recipe_ingredients, recipe_photos, recipes, users};
use crate::models::user::{NewUser, User};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            name: Set(new_user.name),
            surname: Set(new_user.surname),
            email: Set(new_user.email),
            birthday: Set(new_user.birthday),
            provider: Set(new_user.provider),
            picture: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Surname)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Users that own at least one recipe, for the public cook listing.
    pub async fn list_cooks(&self) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .join(JoinType::InnerJoin, users::Relation::Recipes.def())
            .distinct()
            .order_by_asc(users::Column::Surname)
            .all(&self.conn)
            .await
            .context("Failed to list cooks")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn get_by_email_and_provider(
        &self,
        email: &str,
        provider: &str,
    ) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Provider.eq(provider))
            .one(&self.conn)
            .await
            .context("Failed to query user by email and provider")?;

        Ok(user.map(User::from))
    }

    pub async fn exists_by_email_and_provider(&self, email: &str, provider: &str) -> Result<bool> {
        Ok(self
            .get_by_email_and_provider(email, provider)
            .await?
            .is_some())
    }

    /// Sets or clears the profile picture filename. Returns the previous value.
    pub async fn set_picture(&self, id: i64, picture: Option<String>) -> Result<Option<String>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for picture update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let previous = user.picture.clone();

        let mut active: users::ActiveModel = user.into();
        active.picture = Set(picture);
        active.update(&self.conn).await?;

        Ok(previous)
    }

    /// Removes a user and everything it owns in one transaction: junction
    /// rows and photo rows of owned recipes, the recipes, the credentials,
    /// and finally the user row. Image files are the caller's problem.
    pub async fn delete_cascade(&self, id: i64) -> Result<bool> {
        let owned: Vec<i64> = recipes::Entity::find()
            .filter(recipes::Column::UserId.eq(id))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let txn = self.conn.begin().await?;

        if !owned.is_empty() {
            recipe_ingredients::Entity::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.is_in(owned.clone()))
                .exec(&txn)
                .await?;

            recipe_photos::Entity::delete_many()
                .filter(recipe_photos::Column::RecipeId.is_in(owned.clone()))
                .exec(&txn)
                .await?;

            recipes::Entity::delete_many()
                .filter(recipes::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
        }

        credentials::Entity::delete_many()
            .filter(credentials::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed user {} and {} owned recipes", id, owned.len());
        }
        Ok(removed)
    }

    /// Every image filename referenced by this user: recipe photos of owned
    /// recipes plus the profile picture. Used to clean the images directory
    /// before the rows go away.
    pub async fn referenced_image_files(&self, id: i64) -> Result<Vec<String>> {
        let mut files: Vec<String> = recipe_photos::Entity::find()
            .join(
                JoinType::InnerJoin,
                recipe_photos::Relation::Recipes.def(),
            )
            .filter(recipes::Column::UserId.eq(id))
            .all(&self.conn)
            .await
            .context("Failed to query recipe photos for user")?
            .into_iter()
            .map(|p| p.file_name)
            .collect();

        if let Some(user) = users::Entity::find_by_id(id).one(&self.conn).await?
            && let Some(picture) = user.picture
        {
            files.push(picture);
        }

        Ok(files)
    }
}
