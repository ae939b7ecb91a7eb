use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Username of the seeded administrator account.
pub const ADMIN_USERNAME: &str = "admin";

/// Default password of the seeded administrator (change after first login).
pub const ADMIN_DEFAULT_PASSWORD: &str = "password";

/// Role strings stored on credentials rows.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Hash the default admin password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(ADMIN_DEFAULT_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Credentials)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Recipes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Ingredients)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecipeIngredients)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecipePhotos)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed the administrator account so a fresh install is administrable.
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert_user = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Id,
                crate::entities::users::Column::Name,
                crate::entities::users::Column::Surname,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::Provider,
                crate::entities::users::Column::CreatedAt,
            ])
            .values_panic([
                1i64.into(),
                "Admin".into(),
                "Admin".into(),
                "admin@localhost".into(),
                "DEFAULT".into(),
                now.clone().into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_user).await?;

        let insert_credentials = sea_orm_migration::sea_query::Query::insert()
            .into_table(Credentials)
            .columns([
                crate::entities::credentials::Column::Username,
                crate::entities::credentials::Column::PasswordHash,
                crate::entities::credentials::Column::Role,
                crate::entities::credentials::Column::UserId,
                crate::entities::credentials::Column::CreatedAt,
            ])
            .values_panic([
                ADMIN_USERNAME.into(),
                password_hash.into(),
                ADMIN_ROLE.into(),
                1i64.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_credentials).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipePhotos).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredients).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Credentials).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
