use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, RecipeError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service is unavailable", service),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::UsernameTaken => ApiError::Conflict(
                "Username already exists. Please choose another one.".to_string(),
            ),
            AuthError::UserNotFound => ApiError::Unauthorized("User not found".to_string()),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::NotFound(id) => ApiError::NotFound(format!("Recipe {} not found", id)),
            RecipeError::IngredientNotFound(id) => {
                ApiError::NotFound(format!("Ingredient {} not found in recipe", id))
            }
            RecipeError::PhotoNotFound(name) => {
                ApiError::NotFound(format!("Photo '{}' not found", name))
            }
            RecipeError::OwnerNotFound(id) => {
                ApiError::NotFound(format!("User {} not found", id))
            }
            RecipeError::NotOwner(_) => {
                ApiError::Forbidden("Only the recipe owner may do this".to_string())
            }
            RecipeError::Validation(msg) => ApiError::ValidationError(msg),
            RecipeError::Database(msg) => ApiError::DatabaseError(msg),
            RecipeError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => ApiError::NotFound(format!("User {} not found", id)),
            UserError::Validation(msg) => ApiError::ValidationError(msg),
            UserError::Database(msg) => ApiError::DatabaseError(msg),
            UserError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn google_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Google".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
