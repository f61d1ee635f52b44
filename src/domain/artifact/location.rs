use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Object storage identity of a model artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactLocation {
    bucket: String,
    key: String,
}

impl ArtifactLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Raw artifact bytes as fetched from a store
#[derive(Debug, Clone)]
pub struct Artifact {
    location: ArtifactLocation,
    version: String,
    bytes: Bytes,
}

impl Artifact {
    pub fn new(location: ArtifactLocation, version: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            location,
            version: version.into(),
            bytes,
        }
    }

    pub fn location(&self) -> &ArtifactLocation {
        &self.location
    }

    /// ETag, object version id or content digest, whichever the store provides
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// Content digest used when a store has no native version identifier
pub fn content_digest(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}
