//! `/predict` request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Batch of feature rows. Each row is either an object keyed by feature
/// name or an array in schema order.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predictions: Vec<f64>,
}
