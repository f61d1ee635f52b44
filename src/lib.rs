//! Risk Model Serving
//!
//! HTTP inference service for a single pre-trained classifier:
//! - Model artifact fetched from S3 (or a local directory) and cached in-process
//! - Single-flight lazy loading with explicit reload
//! - Schema-ordered feature decoding and batch inference

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::ArtifactLocation;
use infrastructure::{
    artifact::ArtifactStoreFactory,
    cache::{ModelCache, ModelSource},
    model::JsonModelDeserializer,
    services::{PredictionService, PredictionSettings},
};
use tracing::{info, warn};

/// Wire the artifact store, model cache and prediction service together
pub async fn create_prediction_service(config: &AppConfig) -> PredictionService {
    let store = ArtifactStoreFactory::create(&config.artifact).await;
    let location = ArtifactLocation::new(&config.artifact.bucket, &config.artifact.key);

    info!(location = %location, "Serving model artifact");

    let source = ModelSource::new(store, Arc::new(JsonModelDeserializer::new()), location)
        .with_fetch_timeout(config.artifact.fetch_timeout());

    PredictionService::new(
        ModelCache::new(source),
        PredictionSettings::from_config(config),
    )
}

/// Create the application state with all services initialized.
///
/// With `model.preload` the model is loaded before returning. A failed preload
/// is logged and left in the cache; the server still starts so that `/ready`
/// and the admin endpoints can report and recover it.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let service = create_prediction_service(config).await;

    if config.model.preload {
        match service.warm_up().await {
            Ok(model) => info!(
                model = %model.identity().name,
                version = %model.identity().version,
                "Model preloaded"
            ),
            Err(e) => warn!(
                kind = e.code(),
                error = %e,
                "Model preload failed; requests will fail until POST /admin/model/reload succeeds"
            ),
        }
    }

    Ok(AppState::new(Arc::new(service)))
}
