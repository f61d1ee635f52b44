use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::{
    ArtifactError, ArtifactLocation, ArtifactStore, LoadedModel, ModelDeserializer, ModelError,
};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to produce a `LoadedModel`: where the artifact lives,
/// how to fetch it, and how to decode it.
#[derive(Debug, Clone)]
pub struct ModelSource {
    store: Arc<dyn ArtifactStore>,
    deserializer: Arc<dyn ModelDeserializer>,
    location: ArtifactLocation,
    fetch_timeout: Duration,
}

impl ModelSource {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        deserializer: Arc<dyn ModelDeserializer>,
        location: ArtifactLocation,
    ) -> Self {
        Self {
            store,
            deserializer,
            location,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn location(&self) -> &ArtifactLocation {
        &self.location
    }

    pub fn store_name(&self) -> &'static str {
        self.store.store_name()
    }

    /// Fetch and deserialize once. No retries.
    pub async fn load(&self) -> Result<LoadedModel, ModelError> {
        let artifact = tokio::time::timeout(self.fetch_timeout, self.store.fetch(&self.location))
            .await
            .map_err(|_| {
                ArtifactError::transfer(
                    self.location.clone(),
                    format!("fetch timed out after {:?}", self.fetch_timeout),
                )
            })??;

        debug!(
            location = %self.location,
            version = %artifact.version(),
            bytes = artifact.bytes().len(),
            format = self.deserializer.format_name(),
            "Deserializing model artifact"
        );

        let deserializer = Arc::clone(&self.deserializer);
        tokio::task::spawn_blocking(move || deserializer.deserialize(&artifact))
            .await
            .map_err(|e| ModelError::load_aborted(format!("deserialization task failed: {}", e)))?
    }
}
