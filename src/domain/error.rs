use std::sync::Arc;

use thiserror::Error;

use super::artifact::ArtifactLocation;
use super::model::FeatureKind;

/// Artifact store errors
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {location}")]
    NotFound { location: ArtifactLocation },

    #[error("Artifact transfer failed for {location}: {message}")]
    Transfer {
        location: ArtifactLocation,
        message: String,
    },

    #[error("Artifact store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl ArtifactError {
    pub fn not_found(location: ArtifactLocation) -> Self {
        Self::NotFound { location }
    }

    pub fn transfer(location: ArtifactLocation, message: impl Into<String>) -> Self {
        Self::Transfer {
            location,
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Stable kind label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "artifact_not_found",
            Self::Transfer { .. } => "artifact_transfer_error",
            Self::StoreUnavailable { .. } => "artifact_store_unavailable",
        }
    }
}

/// Errors raised while loading a model into the cache
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Model artifact could not be deserialized: {message}")]
    Deserialize { message: String },

    #[error("Model load aborted: {message}")]
    LoadAborted { message: String },
}

impl ModelError {
    pub fn deserialize(message: impl Into<String>) -> Self {
        Self::Deserialize {
            message: message.into(),
        }
    }

    pub fn load_aborted(message: impl Into<String>) -> Self {
        Self::LoadAborted {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Artifact(e) => e.kind(),
            Self::Deserialize { .. } => "model_deserialize_error",
            Self::LoadAborted { .. } => "model_load_aborted",
        }
    }
}

/// The cache could not hand out a model
///
/// Every caller that waited on the same failed load receives the same cause.
#[derive(Debug, Clone, Error)]
#[error("Model unavailable: {cause}")]
pub struct ModelUnavailable {
    pub cause: Arc<ModelError>,
}

impl ModelUnavailable {
    pub fn new(cause: Arc<ModelError>) -> Self {
        Self { cause }
    }

    pub fn is_artifact_not_found(&self) -> bool {
        matches!(
            self.cause.as_ref(),
            ModelError::Artifact(ArtifactError::NotFound { .. })
        )
    }
}

/// Request rows that cannot be mapped onto the model's feature schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Row {row}: missing feature '{feature}'")]
    MissingFeature { row: usize, feature: String },

    #[error("Row {row}: feature '{feature}' expected {expected} value")]
    FeatureTypeMismatch {
        row: usize,
        feature: String,
        expected: FeatureKind,
    },

    #[error("Row {row}: expected {expected} positional values, got {actual}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row}: expected an object or an array of feature values")]
    MalformedRow { row: usize },
}

impl DecodeError {
    pub fn missing_feature(row: usize, feature: impl Into<String>) -> Self {
        Self::MissingFeature {
            row,
            feature: feature.into(),
        }
    }

    pub fn type_mismatch(row: usize, feature: impl Into<String>, expected: FeatureKind) -> Self {
        Self::FeatureTypeMismatch {
            row,
            feature: feature.into(),
            expected,
        }
    }

    pub fn row(&self) -> usize {
        match self {
            Self::MissingFeature { row, .. }
            | Self::FeatureTypeMismatch { row, .. }
            | Self::RowWidthMismatch { row, .. }
            | Self::MalformedRow { row } => *row,
        }
    }

    pub fn feature(&self) -> Option<&str> {
        match self {
            Self::MissingFeature { feature, .. } | Self::FeatureTypeMismatch { feature, .. } => {
                Some(feature)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFeature { .. } => "missing_feature",
            Self::FeatureTypeMismatch { .. } => "feature_type_mismatch",
            Self::RowWidthMismatch { .. } => "row_width_mismatch",
            Self::MalformedRow { .. } => "malformed_row",
        }
    }
}

/// Batch inference failures; any of these aborts the whole batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Feature matrix has {actual} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Predictor returned {actual} scores for {expected} rows")]
    OutputLength { expected: usize, actual: usize },

    #[error("Predictor produced a non-finite score for row {row}")]
    NonFinite { row: usize },

    #[error("Inference failed: {message}")]
    Predictor { message: String },
}

impl InferenceError {
    pub fn predictor(message: impl Into<String>) -> Self {
        Self::Predictor {
            message: message.into(),
        }
    }
}
