use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, IngredientDto, MessageResponse, RecipeDto};
use crate::api::validation::validate_id;
use crate::models::ingredient::NewIngredient;
use crate::models::recipe::NewRecipe;
use crate::services::{AuthContext, RecipeUpdate};

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct AddIngredientRequest {
    pub name: String,
    pub quantity: i32,
}

pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RecipeDto>>>, ApiError> {
    let recipes = state.recipe_service().list().await?;

    Ok(Json(ApiResponse::success(
        recipes.into_iter().map(RecipeDto::from).collect(),
    )))
}

pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    validate_id(id)?;

    let recipe = state.recipe_service().get(id).await?;

    Ok(Json(ApiResponse::success(RecipeDto::from(recipe))))
}

/// POST /recipes — the owner is always the requesting principal.
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    let recipe = state
        .recipe_service()
        .create(
            &ctx,
            NewRecipe {
                name: payload.name,
                description: payload.description,
                category: payload.category,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(RecipeDto::from(recipe))))
}

/// PUT /recipes/{id} — overwrites name and description, owner stays fixed.
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    validate_id(id)?;

    let recipe = state
        .recipe_service()
        .update(
            &ctx,
            id,
            RecipeUpdate {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(RecipeDto::from(recipe))))
}

/// DELETE /recipes/{id} — removes photo files from disk, then the rows.
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id(id)?;

    state.recipe_service().delete(&ctx, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Recipe {id} deleted"),
    })))
}

/// POST /recipes/{id}/photos — multipart upload, field name "image".
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    validate_id(id)?;

    let (file_name, bytes) = read_image_field(multipart).await?;

    state
        .recipe_service()
        .add_photo(&ctx, id, &file_name, bytes)
        .await?;

    let recipe = state.recipe_service().get(id).await?;

    Ok(Json(ApiResponse::success(RecipeDto::from(recipe))))
}

/// DELETE /recipes/{id}/photos/{file_name} — removes exactly the named
/// entry and its file.
pub async fn remove_photo(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, file_name)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id(id)?;

    state
        .recipe_service()
        .remove_photo(&ctx, id, &file_name)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Photo '{file_name}' removed"),
    })))
}

pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<IngredientDto>>>, ApiError> {
    let ingredients = state.recipe_service().list_ingredients().await?;

    Ok(Json(ApiResponse::success(
        ingredients.into_iter().map(IngredientDto::from).collect(),
    )))
}

/// POST /recipes/{id}/ingredients — creates the ingredient and links it.
pub async fn add_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AddIngredientRequest>,
) -> Result<Json<ApiResponse<IngredientDto>>, ApiError> {
    validate_id(id)?;

    let ingredient = state
        .recipe_service()
        .add_ingredient(
            &ctx,
            id,
            NewIngredient {
                name: payload.name,
                quantity: payload.quantity,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(IngredientDto::from(ingredient))))
}

/// DELETE /recipes/{id}/ingredients/{ingredient_id} — unlinks; the row is
/// deleted only once no recipe references it.
pub async fn remove_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id(id)?;
    validate_id(ingredient_id)?;

    state
        .recipe_service()
        .remove_ingredient(&ctx, id, ingredient_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Ingredient {ingredient_id} removed from recipe {id}"),
    })))
}

/// Pulls the "image" field out of a multipart body.
pub(super) async fn read_image_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let file_name = field
                .file_name()
                .map(ToString::to_string)
                .ok_or_else(|| ApiError::validation("Upload is missing a filename"))?;

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?
                .to_vec();

            if bytes.is_empty() {
                return Err(ApiError::validation("Please select a file to upload"));
            }

            return Ok((file_name, bytes));
        }
    }

    Err(ApiError::validation("Missing 'image' field"))
}
