use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::google::GoogleOidcClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, RecipeService, SeaOrmAuthService, SeaOrmRecipeService, SeaOrmUserService,
    UploadStore, UserService,
};

/// All long-lived application objects, constructed once and shared.
///
/// Wiring is explicit: every service is built here and handed to the
/// router state; nothing is resolved at request time.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub uploads: Arc<UploadStore>,

    pub auth_service: Arc<dyn AuthService>,

    pub recipe_service: Arc<dyn RecipeService>,

    pub user_service: Arc<dyn UserService>,

    pub google: Option<Arc<GoogleOidcClient>>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let uploads = Arc::new(UploadStore::new(config.general.images_path.clone()));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let recipe_service = Arc::new(SeaOrmRecipeService::new(store.clone(), uploads.clone()))
            as Arc<dyn RecipeService>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone(), uploads.clone()))
            as Arc<dyn UserService>;

        let google = if config.oauth.google.enabled {
            Some(Arc::new(GoogleOidcClient::new(
                config.oauth.google.clone(),
            )?))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            uploads,
            auth_service,
            recipe_service,
            user_service,
            google,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
