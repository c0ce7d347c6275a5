use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppError,
    resolver::Resolver,
    service::http::HttpService,
    storage::{build_blob_store, BlobStore},
    thumbnail::{FfmpegTool, Thumbnailer},
};

/// Everything a request needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Resolver,
    pub thumbnailer: Thumbnailer,
    pub blob_store: Option<Arc<dyn BlobStore>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http = Arc::new(HttpService::new(&config.http)?);

        let resolver = Resolver::from_config(&config, http.clone());
        let thumbnailer = Thumbnailer::new(
            http,
            Arc::new(FfmpegTool::new(&config.tools)),
            config.thumbnail.clone(),
        );
        let blob_store = build_blob_store(&config.storage);

        Ok(Self::from_parts(config, resolver, thumbnailer, blob_store))
    }

    pub fn from_parts(
        config: AppConfig,
        resolver: Resolver,
        thumbnailer: Thumbnailer,
        blob_store: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
            thumbnailer,
            blob_store,
        }
    }
}
