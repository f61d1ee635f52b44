//! Model cache status as exposed by the admin API

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{FeatureDefault, FeatureKind, FeatureSpec, LoadedModel, ModelError};
use crate::infrastructure::cache::{CachePhase, CacheStatus};

/// `GET /admin/model` body
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatusResponse {
    pub state: CachePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LoadErrorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub bucket: String,
    pub key: String,
    pub version: String,
    pub loaded_at: DateTime<Utc>,
    pub predictor: String,
    pub features: Vec<FeatureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadErrorSummary {
    pub code: String,
    pub message: String,
}

impl From<&FeatureSpec> for FeatureSummary {
    fn from(spec: &FeatureSpec) -> Self {
        let categories = match spec.kind() {
            FeatureKind::Categorical => Some(spec.categories().to_vec()),
            FeatureKind::Numeric => None,
        };

        let default = spec.default().map(|default| match default {
            FeatureDefault::Number(n) => Value::from(*n),
            FeatureDefault::Category(c) => Value::from(c.clone()),
        });

        Self {
            name: spec.name().to_string(),
            kind: spec.kind(),
            categories,
            default,
        }
    }
}

impl From<&LoadedModel> for ModelSummary {
    fn from(model: &LoadedModel) -> Self {
        let identity = model.identity();

        Self {
            name: identity.name.clone(),
            bucket: identity.bucket.clone(),
            key: identity.key.clone(),
            version: identity.version.clone(),
            loaded_at: model.loaded_at(),
            predictor: model.predictor().describe(),
            features: model.schema().features().iter().map(Into::into).collect(),
        }
    }
}

impl From<&ModelError> for LoadErrorSummary {
    fn from(err: &ModelError) -> Self {
        Self {
            code: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CacheStatus> for ModelStatusResponse {
    fn from(status: CacheStatus) -> Self {
        Self {
            state: status.phase,
            model: status.model.as_deref().map(Into::into),
            error: status.error.as_deref().map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_summary_for_categorical_with_default() {
        let spec = FeatureSpec::categorical("segment", ["retail", "hni"])
            .with_default(FeatureDefault::Category("retail".to_string()));

        let json = serde_json::to_value(FeatureSummary::from(&spec)).unwrap();

        assert_eq!(json["type"], "categorical");
        assert_eq!(json["categories"][1], "hni");
        assert_eq!(json["default"], "retail");
    }

    #[test]
    fn test_feature_summary_for_numeric_omits_categories() {
        let json = serde_json::to_value(FeatureSummary::from(&FeatureSpec::numeric("age"))).unwrap();

        assert_eq!(json["type"], "numeric");
        assert!(json.get("categories").is_none());
        assert!(json.get("default").is_none());
    }

    #[test]
    fn test_failed_status_carries_error() {
        let status = CacheStatus {
            phase: CachePhase::Failed,
            model: None,
            error: Some(std::sync::Arc::new(ModelError::deserialize("bad tree"))),
        };

        let json = serde_json::to_value(ModelStatusResponse::from(status)).unwrap();

        assert_eq!(json["state"], "failed");
        assert!(json.get("model").is_none());
        assert_eq!(json["error"]["code"], "model_deserialize_error");
    }
}
