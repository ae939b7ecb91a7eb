use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::ingredient::{Ingredient, NewIngredient};
use crate::models::recipe::{NewRecipe, Recipe};
use crate::models::user::{NewUser, User};

pub mod migrator;
pub mod repositories;

pub use repositories::credentials::Credentials;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn credentials_repo(&self) -> repositories::credentials::CredentialsRepository {
        repositories::credentials::CredentialsRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    fn ingredient_repo(&self) -> repositories::ingredient::IngredientRepository {
        repositories::ingredient::IngredientRepository::new(self.conn.clone())
    }

    // ---- users ----

    pub async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().insert(new_user).await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.user_repo().get(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn list_cooks(&self) -> Result<Vec<User>> {
        self.user_repo().list_cooks().await
    }

    pub async fn get_user_by_email_and_provider(
        &self,
        email: &str,
        provider: &str,
    ) -> Result<Option<User>> {
        self.user_repo()
            .get_by_email_and_provider(email, provider)
            .await
    }

    pub async fn user_exists_by_email_and_provider(
        &self,
        email: &str,
        provider: &str,
    ) -> Result<bool> {
        self.user_repo()
            .exists_by_email_and_provider(email, provider)
            .await
    }

    pub async fn set_user_picture(
        &self,
        id: i64,
        picture: Option<String>,
    ) -> Result<Option<String>> {
        self.user_repo().set_picture(id, picture).await
    }

    pub async fn delete_user_cascade(&self, id: i64) -> Result<bool> {
        self.user_repo().delete_cascade(id).await
    }

    pub async fn user_image_files(&self, id: i64) -> Result<Vec<String>> {
        self.user_repo().referenced_image_files(id).await
    }

    // ---- credentials ----

    pub async fn get_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        self.credentials_repo().get_by_username(username).await
    }

    pub async fn credentials_exist(&self, username: &str) -> Result<bool> {
        self.credentials_repo().exists_by_username(username).await
    }

    pub async fn get_credentials_with_user(
        &self,
        username: &str,
    ) -> Result<Option<(Credentials, User)>> {
        self.credentials_repo().get_with_user(username).await
    }

    pub async fn get_credentials_by_user_id(&self, user_id: i64) -> Result<Option<Credentials>> {
        self.credentials_repo().get_by_user_id(user_id).await
    }

    pub async fn insert_credentials(
        &self,
        username: &str,
        password: &str,
        role: &str,
        user_id: i64,
        security: Option<&SecurityConfig>,
    ) -> Result<Credentials> {
        self.credentials_repo()
            .insert(username, password, role, user_id, security)
            .await
    }

    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        self.credentials_repo()
            .verify_password(username, password)
            .await
    }

    pub async fn update_password(&self, username: &str, new_password: &str) -> Result<()> {
        self.credentials_repo()
            .update_password(username, new_password)
            .await
    }

    // ---- recipes ----

    pub async fn insert_recipe(&self, new_recipe: NewRecipe, owner_id: i64) -> Result<Recipe> {
        self.recipe_repo().insert(new_recipe, owner_id).await
    }

    pub async fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        self.recipe_repo().get(id).await
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        self.recipe_repo().list_all().await
    }

    pub async fn list_recipes_by_owner(&self, user_id: i64) -> Result<Vec<Recipe>> {
        self.recipe_repo().list_by_owner(user_id).await
    }

    pub async fn update_recipe_details(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<bool> {
        self.recipe_repo()
            .update_details(id, name, description)
            .await
    }

    pub async fn delete_recipe(&self, id: i64) -> Result<bool> {
        self.recipe_repo().delete(id).await
    }

    pub async fn add_recipe_photo(&self, recipe_id: i64, file_name: &str) -> Result<()> {
        self.recipe_repo().add_photo(recipe_id, file_name).await
    }

    pub async fn remove_recipe_photo(&self, recipe_id: i64, file_name: &str) -> Result<bool> {
        self.recipe_repo().remove_photo(recipe_id, file_name).await
    }

    pub async fn list_recipe_photos(&self, recipe_id: i64) -> Result<Vec<String>> {
        self.recipe_repo().list_photos(recipe_id).await
    }

    pub async fn link_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<()> {
        self.recipe_repo()
            .link_ingredient(recipe_id, ingredient_id)
            .await
    }

    pub async fn unlink_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<bool> {
        self.recipe_repo()
            .unlink_ingredient(recipe_id, ingredient_id)
            .await
    }

    pub async fn ingredient_usage_count(&self, ingredient_id: i64) -> Result<u64> {
        self.recipe_repo()
            .ingredient_usage_count(ingredient_id)
            .await
    }

    // ---- ingredients ----

    pub async fn insert_ingredient(&self, new_ingredient: NewIngredient) -> Result<Ingredient> {
        self.ingredient_repo().insert(new_ingredient).await
    }

    pub async fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        self.ingredient_repo().get(id).await
    }

    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.ingredient_repo().list_all().await
    }

    pub async fn delete_ingredient(&self, id: i64) -> Result<bool> {
        self.ingredient_repo().delete(id).await
    }
}
