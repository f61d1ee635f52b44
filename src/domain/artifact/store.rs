use async_trait::async_trait;
use std::fmt::Debug;

use super::{Artifact, ArtifactLocation};
use crate::domain::ArtifactError;

/// Fetch primitive for model artifacts (S3, local directory, ...)
///
/// Implementations neither retry nor cache; both belong to the caller.
#[async_trait]
pub trait ArtifactStore: Send + Sync + Debug {
    /// Fetch the full artifact stored at `location`
    async fn fetch(&self, location: &ArtifactLocation) -> Result<Artifact, ArtifactError>;

    /// Get store name for logging/debugging
    fn store_name(&self) -> &'static str;
}
