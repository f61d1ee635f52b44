//! Artifact store implementations

mod factory;
mod fs_store;
mod s3_store;

pub use factory::ArtifactStoreFactory;
pub use fs_store::FilesystemArtifactStore;
pub use s3_store::{RealS3Client, S3ArtifactStore, S3Object, S3ObjectClient};
