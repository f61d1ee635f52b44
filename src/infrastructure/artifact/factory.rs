use std::sync::Arc;

use tracing::info;

use super::{FilesystemArtifactStore, S3ArtifactStore};
use crate::config::{ArtifactBackend, ArtifactConfig};
use crate::domain::ArtifactStore;

/// Factory for creating the configured artifact store
#[derive(Debug)]
pub struct ArtifactStoreFactory;

impl ArtifactStoreFactory {
    pub async fn create(config: &ArtifactConfig) -> Arc<dyn ArtifactStore> {
        match config.backend {
            ArtifactBackend::S3 => {
                info!(
                    region = config.region.as_deref().unwrap_or("default"),
                    endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
                    "Using S3 artifact store"
                );
                Arc::new(
                    S3ArtifactStore::from_env(
                        config.region.clone(),
                        config.endpoint_url.clone(),
                        config.force_path_style,
                    )
                    .await,
                )
            }
            ArtifactBackend::Filesystem => {
                info!(root = %config.root.display(), "Using filesystem artifact store");
                Arc::new(FilesystemArtifactStore::new(config.root.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_filesystem_store() {
        let config = ArtifactConfig {
            backend: ArtifactBackend::Filesystem,
            ..ArtifactConfig::default()
        };

        let store = ArtifactStoreFactory::create(&config).await;
        assert_eq!(store.store_name(), "filesystem");
    }
}
