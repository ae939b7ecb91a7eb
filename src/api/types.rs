use serde::Serialize;

use crate::models::ingredient::Ingredient;
use crate::models::recipe::Recipe;
use crate::models::user::User;
use crate::services::user_service::Profile;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: Option<String>,
    pub provider: String,
    pub picture: Option<String>,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            birthday: user.birthday,
            provider: user.provider,
            picture: user.picture.map(|p| format!("/images/{p}")),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientDto {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
}

impl From<Ingredient> for IngredientDto {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            quantity: ingredient.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub user_id: i64,
    pub created_at: String,
    /// Stored filenames, as accepted by the photo-removal route.
    pub photos: Vec<String>,
    /// Public URLs under the static images mount.
    pub photo_urls: Vec<String>,
    pub ingredients: Vec<IngredientDto>,
}

impl From<Recipe> for RecipeDto {
    fn from(recipe: Recipe) -> Self {
        let photo_urls = recipe
            .photos
            .iter()
            .map(|p| format!("/images/{p}"))
            .collect();

        Self {
            id: recipe.id,
            name: recipe.name,
            description: recipe.description,
            category: recipe.category,
            user_id: recipe.user_id,
            created_at: recipe.created_at,
            photos: recipe.photos,
            photo_urls,
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(IngredientDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub user: UserDto,
    pub recipes: Vec<RecipeDto>,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            user: UserDto::from(profile.user),
            recipes: profile
                .recipes
                .into_iter()
                .map(RecipeDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
