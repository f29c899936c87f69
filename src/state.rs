use std::sync::Arc;

use sqlx::PgPool;

use edunexus_config::{CorsConfig, JwtConfig, UploadConfig};
use edunexus_core::file_storage::{FileStorage, LocalFileStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub upload_config: UploadConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Builds state around an existing pool with local disk storage rooted at
    /// `upload_config.dir`.
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        upload_config: UploadConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            upload_config.dir.clone(),
            upload_config.max_file_size,
        );
        Self {
            db,
            jwt_config,
            cors_config,
            upload_config,
            storage: Arc::new(storage),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cors_config", &self.cors_config)
            .field("upload_config", &self.upload_config)
            .finish_non_exhaustive()
    }
}

pub async fn init_app_state() -> AppState {
    AppState::new(
        edunexus_db::init_db_pool().await,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        UploadConfig::from_env(),
    )
}
