//! Model artifact format and predictor implementations

pub mod document;
mod json_deserializer;
mod linear;
mod objective;
mod tree;

pub use json_deserializer::JsonModelDeserializer;
pub use linear::LinearModel;
pub use objective::Objective;
pub use tree::TreeEnsemble;

#[cfg(test)]
pub mod fixtures {
    use serde_json::json;

    /// Linear regression over numeric `names` that predicts the row sum
    pub fn sum_model_json(names: &[&str]) -> Vec<u8> {
        let features: Vec<_> = names
            .iter()
            .map(|name| json!({"type": "numeric", "name": name}))
            .collect();
        let weights: Vec<_> = names.iter().map(|_| json!([1.0])).collect();

        serde_json::to_vec(&json!({
            "format_version": 1,
            "name": "sum",
            "objective": "reg:squarederror",
            "features": features,
            "booster": {"type": "gblinear", "weights": weights, "bias": [0.0]}
        }))
        .unwrap()
    }
}
