use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::{content_digest, Artifact, ArtifactError, ArtifactLocation, ArtifactStore};

/// Artifact store over a local directory, laid out as `<root>/<bucket>/<key>`
///
/// Intended for development and air-gapped deployments.
#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a location under the root; `None` if it would escape it
    fn resolve(&self, location: &ArtifactLocation) -> Option<PathBuf> {
        let bucket = Path::new(location.bucket());
        let key = Path::new(location.key());

        let is_plain = |p: &Path| {
            !p.as_os_str().is_empty() && p.components().all(|c| matches!(c, Component::Normal(_)))
        };

        if is_plain(bucket) && is_plain(key) {
            Some(self.root.join(bucket).join(key))
        } else {
            None
        }
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn fetch(&self, location: &ArtifactLocation) -> Result<Artifact, ArtifactError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ArtifactError::store_unavailable(format!(
                    "artifact root {} is not a directory",
                    self.root.display()
                )));
            }
            Err(e) => {
                return Err(ArtifactError::store_unavailable(format!(
                    "artifact root {} is not accessible: {}",
                    self.root.display(),
                    e
                )));
            }
        }

        let path = self
            .resolve(location)
            .ok_or_else(|| ArtifactError::not_found(location.clone()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArtifactError::not_found(location.clone()));
            }
            Err(e) => {
                return Err(ArtifactError::transfer(
                    location.clone(),
                    format!("failed to read {}: {}", path.display(), e),
                ));
            }
        };

        debug!(path = %path.display(), bytes = bytes.len(), "Read artifact from filesystem");

        let version = content_digest(&bytes);
        Ok(Artifact::new(location.clone(), version, bytes))
    }

    fn store_name(&self) -> &'static str {
        "filesystem"
    }
}
