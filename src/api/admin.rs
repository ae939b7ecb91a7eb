use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, RecipeDto, UserDto};
use crate::api::validation::validate_id;
use crate::models::recipe::NewRecipe;

#[derive(Deserialize)]
pub struct CreateRecipeForUserRequest {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// GET /admin/users — every registered user.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// DELETE /admin/users/{id} — cascading delete: owned recipes, their
/// image files and rows, the credentials, the user.
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id(id)?;

    state.user_service().delete_user(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("User {id} deleted"),
    })))
}

/// DELETE /admin/users/{id}/photo — forced profile photo removal.
pub async fn remove_user_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id(id)?;

    state.user_service().remove_profile_photo(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Profile photo removed for user {id}"),
    })))
}

/// POST /admin/recipes — creates a recipe on behalf of an existing user.
pub async fn create_recipe_for_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecipeForUserRequest>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    validate_id(payload.user_id)?;

    let recipe = state
        .recipe_service()
        .create_for_user(
            payload.user_id,
            NewRecipe {
                name: payload.name,
                description: payload.description,
                category: payload.category,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(RecipeDto::from(recipe))))
}
