//! Model artifact identity and the store abstraction

mod location;
mod store;

pub use location::{content_digest, Artifact, ArtifactLocation};
pub use store::ArtifactStore;

#[cfg(test)]
pub use store::mock;
