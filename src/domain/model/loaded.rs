use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{FeatureSchema, Predictor};
use crate::domain::ArtifactLocation;

/// Where a loaded model came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelIdentity {
    pub name: String,
    pub bucket: String,
    pub key: String,
    pub version: String,
}

impl ModelIdentity {
    pub fn new(name: impl Into<String>, location: &ArtifactLocation, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: location.bucket().to_string(),
            key: location.key().to_string(),
            version: version.into(),
        }
    }
}

/// A deserialized predictor bound to its feature schema
///
/// The schema never changes for the lifetime of the instance; a new schema
/// means a new `LoadedModel` via reload.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    identity: ModelIdentity,
    schema: FeatureSchema,
    predictor: Arc<dyn Predictor>,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn new(identity: ModelIdentity, schema: FeatureSchema, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            identity,
            schema,
            predictor,
            loaded_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> &ModelIdentity {
        &self.identity
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
