//! Feature schema a loaded model was trained on

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a model input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// Type of a feature along with its encoding data
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureType {
    Numeric,
    /// Encoded as the category's position in `categories`
    Categorical { categories: Vec<String> },
}

impl FeatureType {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Numeric => FeatureKind::Numeric,
            Self::Categorical { .. } => FeatureKind::Categorical,
        }
    }
}

/// Value substituted when a row omits the feature
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureDefault {
    Number(f64),
    Category(String),
}

/// Schema validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Feature schema is empty")]
    Empty,

    #[error("Duplicate feature name '{0}'")]
    DuplicateFeature(String),

    #[error("Feature name must not be empty")]
    EmptyName,

    #[error("Categorical feature '{0}' declares no categories")]
    EmptyCategories(String),

    #[error("Categorical feature '{feature}' declares category '{category}' twice")]
    DuplicateCategory { feature: String, category: String },

    #[error("Default for feature '{feature}' is not a valid {expected} value")]
    InvalidDefault {
        feature: String,
        expected: FeatureKind,
    },
}

/// A single named, typed model input
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    name: String,
    feature_type: FeatureType,
    default: Option<FeatureDefault>,
}

impl FeatureSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feature_type: FeatureType::Numeric,
            default: None,
        }
    }

    pub fn categorical<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            feature_type: FeatureType::Categorical {
                categories: categories.into_iter().map(Into::into).collect(),
            },
            default: None,
        }
    }

    pub fn with_default(mut self, default: FeatureDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_type(&self) -> &FeatureType {
        &self.feature_type
    }

    pub fn kind(&self) -> FeatureKind {
        self.feature_type.kind()
    }

    pub fn default(&self) -> Option<&FeatureDefault> {
        self.default.as_ref()
    }

    /// Category names, empty for numeric features
    pub fn categories(&self) -> &[String] {
        match &self.feature_type {
            FeatureType::Categorical { categories } => categories,
            FeatureType::Numeric => &[],
        }
    }

    /// Numeric code of a category, if it is one of the declared ones
    pub fn category_code(&self, category: &str) -> Option<f64> {
        self.categories()
            .iter()
            .position(|c| c == category)
            .map(|index| index as f64)
    }

    /// Encoded default value, `None` when the feature is required
    pub fn encoded_default(&self) -> Option<f64> {
        match (&self.feature_type, self.default.as_ref()?) {
            (FeatureType::Numeric, FeatureDefault::Number(value)) => Some(*value),
            (FeatureType::Categorical { .. }, FeatureDefault::Category(category)) => {
                self.category_code(category)
            }
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName);
        }

        if let FeatureType::Categorical { categories } = &self.feature_type {
            if categories.is_empty() {
                return Err(SchemaError::EmptyCategories(self.name.clone()));
            }

            let mut seen = HashSet::new();
            for category in categories {
                if !seen.insert(category.as_str()) {
                    return Err(SchemaError::DuplicateCategory {
                        feature: self.name.clone(),
                        category: category.clone(),
                    });
                }
            }
        }

        let default_ok = match &self.default {
            None => true,
            Some(FeatureDefault::Number(value)) => {
                self.kind() == FeatureKind::Numeric && value.is_finite()
            }
            Some(FeatureDefault::Category(category)) => self.category_code(category).is_some(),
        };

        if !default_ok {
            return Err(SchemaError::InvalidDefault {
                feature: self.name.clone(),
                expected: self.kind(),
            });
        }

        Ok(())
    }
}

/// Ordered feature list; column `i` of every feature matrix is feature `i`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Result<Self, SchemaError> {
        if features.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut names = HashSet::new();
        for feature in &features {
            feature.validate()?;

            if !names.insert(feature.name()) {
                return Err(SchemaError::DuplicateFeature(feature.name().to_string()));
            }
        }

        Ok(Self { features })
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn ordered_feature_names(&self) -> Vec<&str> {
        self.features.iter().map(FeatureSpec::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_preserves_order() {
        let schema = FeatureSchema::new(vec![
            FeatureSpec::numeric("b"),
            FeatureSpec::numeric("a"),
            FeatureSpec::categorical("segment", ["retail", "hni"]),
        ])
        .unwrap();

        assert_eq!(schema.ordered_feature_names(), vec!["b", "a", "segment"]);
        assert_eq!(schema.features()[2].kind(), FeatureKind::Categorical);
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec![FeatureSpec::numeric("a"), FeatureSpec::numeric("a")]);
        assert_eq!(result, Err(SchemaError::DuplicateFeature("a".to_string())));
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert_eq!(FeatureSchema::new(vec![]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_categorical_validation() {
        let result = FeatureSchema::new(vec![FeatureSpec::categorical("c", Vec::<String>::new())]);
        assert_eq!(result, Err(SchemaError::EmptyCategories("c".to_string())));

        let result = FeatureSchema::new(vec![FeatureSpec::categorical("c", ["x", "x"])]);
        assert!(matches!(result, Err(SchemaError::DuplicateCategory { .. })));
    }

    #[test]
    fn test_default_must_match_kind() {
        let bad = FeatureSpec::numeric("a").with_default(FeatureDefault::Category("x".into()));
        assert!(matches!(
            FeatureSchema::new(vec![bad]),
            Err(SchemaError::InvalidDefault { .. })
        ));

        let bad = FeatureSpec::categorical("c", ["x"])
            .with_default(FeatureDefault::Category("y".into()));
        assert!(FeatureSchema::new(vec![bad]).is_err());

        let bad = FeatureSpec::numeric("a").with_default(FeatureDefault::Number(f64::NAN));
        assert!(FeatureSchema::new(vec![bad]).is_err());
    }

    #[test]
    fn test_encoded_default() {
        let numeric = FeatureSpec::numeric("a").with_default(FeatureDefault::Number(0.0));
        assert_eq!(numeric.encoded_default(), Some(0.0));

        let categorical = FeatureSpec::categorical("c", ["low", "mid", "high"])
            .with_default(FeatureDefault::Category("mid".into()));
        assert_eq!(categorical.encoded_default(), Some(1.0));

        assert_eq!(FeatureSpec::numeric("required").encoded_default(), None);
    }
}
