//! On-disk JSON layout of a model artifact

use serde::{Deserialize, Serialize};

use super::Objective;

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub objective: Objective,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_class: Option<usize>,
    #[serde(default)]
    pub base_margin: f64,
    pub features: Vec<FeatureDocument>,
    pub booster: BoosterDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeatureDocument {
    Numeric {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    Categorical {
        name: String,
        categories: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoosterDocument {
    Gbtree {
        trees: Vec<TreeDocument>,
    },
    /// `weights[feature][group]`
    Gblinear {
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default)]
    pub group: usize,
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeDocument {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}
