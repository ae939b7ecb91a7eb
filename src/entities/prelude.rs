pub use super::credentials::Entity as Credentials;
pub use super::ingredients::Entity as Ingredients;
pub use super::recipe_ingredients::Entity as RecipeIngredients;
pub use super::recipe_photos::Entity as RecipePhotos;
pub use super::recipes::Entity as Recipes;
pub use super::users::Entity as Users;
