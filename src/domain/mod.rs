//! Domain layer - model serving entities, decoding and inference

pub mod artifact;
pub mod error;
pub mod features;
pub mod inference;
pub mod model;

pub use artifact::{content_digest, Artifact, ArtifactLocation, ArtifactStore};
pub use error::{ArtifactError, DecodeError, InferenceError, ModelError, ModelUnavailable};
pub use model::{
    FeatureDefault, FeatureKind, FeatureMatrix, FeatureSchema, FeatureSpec, FeatureType,
    LoadedModel, ModelDeserializer, ModelIdentity, Predictor, SchemaError,
};
