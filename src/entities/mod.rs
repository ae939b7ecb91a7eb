pub mod prelude;

pub mod credentials;
pub mod ingredients;
pub mod recipe_ingredients;
pub mod recipe_photos;
pub mod recipes;
pub mod users;
