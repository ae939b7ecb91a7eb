pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthContext, AuthError, AuthService, LoginResult, Registration, Role};
pub use auth_service_impl::SeaOrmAuthService;

pub mod recipe_service;
pub mod recipe_service_impl;
pub use recipe_service::{RecipeError, RecipeService, RecipeUpdate};
pub use recipe_service_impl::SeaOrmRecipeService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{Profile, UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod upload;
pub use upload::UploadStore;
