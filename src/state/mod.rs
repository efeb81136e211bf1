use std::sync::Arc;

use thiserror::Error;

use crate::auth::TokenService;
use crate::core::config::{AppPaths, Settings};
use crate::core::errors::ApiError;
use crate::history::ChatStore;
use crate::rag::RagPipeline;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to load configuration: {0}")]
    Config(ApiError),
    #[error("failed to open chat store: {0}")]
    Store(ApiError),
}

/// Application state shared across all routes and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Arc<Settings>,
    pub tokens: TokenService,
    pub store: ChatStore,
    pub pipeline: Arc<RagPipeline>,
}

impl AppState {
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let settings =
            Arc::new(Settings::load(&paths).map_err(InitializationError::Config)?);

        let tokens = TokenService::new(
            &settings.auth.jwt_secret,
            settings.auth.token_lifetime_minutes,
        );

        let store = ChatStore::new(paths.db_path.clone())
            .await
            .map_err(InitializationError::Store)?;

        // Built lazily: the first chat request pays the build latency.
        let pipeline = Arc::new(RagPipeline::from_settings(&settings.rag));

        Ok(Arc::new(AppState {
            paths,
            settings,
            tokens,
            store,
            pipeline,
        }))
    }
}
