//! Loaded model domain: feature schema, matrix layout and predictor seam

mod loaded;
mod matrix;
mod predictor;
mod schema;

pub use loaded::{LoadedModel, ModelIdentity};
pub use matrix::FeatureMatrix;
pub use predictor::{ModelDeserializer, Predictor};
pub use schema::{FeatureDefault, FeatureKind, FeatureSchema, FeatureSpec, FeatureType, SchemaError};
