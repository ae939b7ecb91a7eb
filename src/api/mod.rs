use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::clients::google::GoogleOidcClient;
use crate::config::Config;
use crate::db::Store;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod observability;
mod recipes;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AuthService, RecipeService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn recipe_service(&self) -> &Arc<dyn RecipeService> {
        &self.shared.recipe_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn google(&self) -> Option<&Arc<GoogleOidcClient>> {
        self.shared.google.as_ref()
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (images_path, cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.general.images_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth::auth_middleware);

    let protected_routes = create_protected_router(state.clone());
    let admin_routes = create_admin_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    // Paths mixing public GETs with authenticated mutations carry the auth
    // middleware per method.
    let api_router = Router::new()
        .merge(protected_routes)
        .nest("/admin", admin_routes)
        .route(
            "/recipes",
            post(recipes::create_recipe)
                .route_layer(auth_layer.clone())
                .get(recipes::list_recipes),
        )
        .route(
            "/recipes/{id}",
            put(recipes::update_recipe)
                .delete(recipes::delete_recipe)
                .route_layer(auth_layer)
                .get(recipes::get_recipe),
        )
        .route("/cooks", get(users::list_cooks))
        .route("/cooks/{id}", get(users::get_cook))
        .route("/ingredients", get(recipes::list_ingredients))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/users/me", get(users::me))
        .route(
            "/users/me/photo",
            post(users::upload_profile_photo).delete(users::remove_profile_photo),
        )
        .route("/recipes/{id}/photos", post(recipes::upload_photo))
        .route(
            "/recipes/{id}/photos/{file_name}",
            delete(recipes::remove_photo),
        )
        .route("/recipes/{id}/ingredients", post(recipes::add_ingredient))
        .route(
            "/recipes/{id}/ingredients/{ingredient_id}",
            delete(recipes::remove_ingredient),
        )
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::remove_user))
        .route("/users/{id}/photo", delete(admin::remove_user_photo))
        .route(
            "/recipes",
            get(recipes::list_recipes).post(admin::create_recipe_for_user),
        )
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
