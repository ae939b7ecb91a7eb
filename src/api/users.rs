use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, ProfileDto, UserDto};
use crate::api::recipes::read_image_field;
use crate::api::validation::validate_id;
use crate::services::AuthContext;

/// GET /cooks — users owning at least one recipe.
pub async fn list_cooks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let cooks = state.user_service().list_cooks().await?;

    Ok(Json(ApiResponse::success(
        cooks.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /cooks/{id} — a cook with their recipes.
pub async fn get_cook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    validate_id(id)?;

    let profile = state.user_service().get_cook(id).await?;

    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}

/// GET /users/me — own profile with owned recipes.
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.user_service().profile(ctx.user_id).await?;

    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}

/// POST /users/me/photo — multipart profile photo upload.
pub async fn upload_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let (file_name, bytes) = read_image_field(multipart).await?;

    let stored = state
        .user_service()
        .set_profile_photo(ctx.user_id, &file_name, bytes)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("You successfully uploaded '{stored}'"),
    })))
}

/// DELETE /users/me/photo — clears the field and deletes the file.
pub async fn remove_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service()
        .remove_profile_photo(ctx.user_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Profile photo removed".to_string(),
    })))
}
