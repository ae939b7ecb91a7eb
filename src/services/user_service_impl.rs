//! `SeaORM` implementation of the `UserService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::services::upload::UploadStore;
use crate::services::user_service::{Profile, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    uploads: Arc<UploadStore>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, uploads: Arc<UploadStore>) -> Self {
        Self { store, uploads }
    }

    async fn profile_of(&self, user_id: i64) -> Result<Profile, UserError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let recipes = self.store.list_recipes_by_owner(user_id).await?;

        Ok(Profile { user, recipes })
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list_cooks(&self) -> Result<Vec<crate::models::user::User>, UserError> {
        Ok(self.store.list_cooks().await?)
    }

    async fn get_cook(&self, id: i64) -> Result<Profile, UserError> {
        self.profile_of(id).await
    }

    async fn profile(&self, user_id: i64) -> Result<Profile, UserError> {
        self.profile_of(user_id).await
    }

    async fn set_profile_photo(
        &self,
        user_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UserError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let stored = self
            .uploads
            .save(file_name, &bytes)
            .await
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.store
            .set_user_picture(user_id, Some(stored.clone()))
            .await?;

        Ok(stored)
    }

    async fn remove_profile_photo(&self, user_id: i64) -> Result<(), UserError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let previous = self.store.set_user_picture(user_id, None).await?;

        if let Some(file_name) = previous {
            self.uploads.delete(&file_name).await?;
        }

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<crate::models::user::User>, UserError> {
        Ok(self.store.list_users().await?)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError> {
        // Files first, then rows. A failed file delete is logged and
        // skipped so the cascade still completes.
        let files = self.store.user_image_files(user_id).await?;
        for file_name in &files {
            if let Err(e) = self.uploads.delete(file_name).await {
                warn!("Failed to delete image file {}: {}", file_name, e);
            }
        }

        if !self.store.delete_user_cascade(user_id).await? {
            return Err(UserError::NotFound(user_id));
        }

        info!("Deleted user {} ({} image files)", user_id, files.len());

        Ok(())
    }
}
