use std::sync::Arc;

use tracing::debug;

use super::document::{
    BoosterDocument, FeatureDocument, ModelDocument, SUPPORTED_FORMAT_VERSION,
};
use super::{LinearModel, TreeEnsemble};
use crate::domain::{
    Artifact, FeatureDefault, FeatureSchema, FeatureSpec, LoadedModel, ModelDeserializer,
    ModelError, ModelIdentity, Predictor,
};

/// Deserializer for the JSON model export format
#[derive(Debug, Default, Clone)]
pub struct JsonModelDeserializer;

impl JsonModelDeserializer {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate raw bytes without binding them to an artifact location
    pub fn parse(bytes: &[u8]) -> Result<(ModelDocument, FeatureSchema, Arc<dyn Predictor>), ModelError> {
        let document: ModelDocument = serde_json::from_slice(bytes)
            .map_err(|e| ModelError::deserialize(format!("invalid model document: {}", e)))?;

        if document.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::deserialize(format!(
                "unsupported format_version {} (supported: {})",
                document.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        if !document.base_margin.is_finite() {
            return Err(ModelError::deserialize("base_margin must be finite"));
        }

        let schema = build_schema(&document.features)?;
        let predictor = build_predictor(&document, schema.len())?;

        Ok((document, schema, predictor))
    }
}

impl ModelDeserializer for JsonModelDeserializer {
    fn deserialize(&self, artifact: &Artifact) -> Result<LoadedModel, ModelError> {
        let (document, schema, predictor) = Self::parse(artifact.bytes())?;

        let name = document
            .name
            .clone()
            .unwrap_or_else(|| default_name(artifact.location().key()));

        debug!(
            model = %name,
            features = schema.len(),
            predictor = %predictor.describe(),
            "Model document validated"
        );

        Ok(LoadedModel::new(
            ModelIdentity::new(name, artifact.location(), artifact.version()),
            schema,
            predictor,
        ))
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

fn build_schema(features: &[FeatureDocument]) -> Result<FeatureSchema, ModelError> {
    let specs = features
        .iter()
        .map(|feature| match feature {
            FeatureDocument::Numeric { name, default } => {
                let spec = FeatureSpec::numeric(name);
                match default {
                    Some(value) => spec.with_default(FeatureDefault::Number(*value)),
                    None => spec,
                }
            }
            FeatureDocument::Categorical {
                name,
                categories,
                default,
            } => {
                let spec = FeatureSpec::categorical(name, categories.iter().cloned());
                match default {
                    Some(category) => spec.with_default(FeatureDefault::Category(category.clone())),
                    None => spec,
                }
            }
        })
        .collect();

    FeatureSchema::new(specs).map_err(|e| ModelError::deserialize(format!("invalid feature schema: {}", e)))
}

fn build_predictor(document: &ModelDocument, num_features: usize) -> Result<Arc<dyn Predictor>, ModelError> {
    let num_groups = document
        .objective
        .num_groups(document.num_class)
        .map_err(ModelError::deserialize)?;

    let predictor: Arc<dyn Predictor> = match &document.booster {
        BoosterDocument::Gbtree { trees } => Arc::new(
            TreeEnsemble::from_documents(
                trees,
                document.objective,
                num_groups,
                num_features,
                document.base_margin,
            )
            .map_err(ModelError::deserialize)?,
        ),
        BoosterDocument::Gblinear { weights, bias } => Arc::new(
            LinearModel::new(
                weights,
                bias.clone(),
                document.objective,
                num_groups,
                num_features,
                document.base_margin,
            )
            .map_err(ModelError::deserialize)?,
        ),
    };

    Ok(predictor)
}

/// File stem of the artifact key, e.g. `models/risk.json` → `risk`
fn default_name(key: &str) -> String {
    let file = key.rsplit('/').next().unwrap_or(key);
    file.split('.').next().unwrap_or(file).to_string()
}
