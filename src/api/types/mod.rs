//! Request and response types for the HTTP API

pub mod error;
pub mod json;
pub mod model_status;
pub mod predict;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use model_status::{FeatureSummary, LoadErrorSummary, ModelStatusResponse, ModelSummary};
pub use predict::{PredictRequest, PredictResponse};
