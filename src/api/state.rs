//! Application state for shared services

use std::sync::Arc;

use serde_json::Value;

use crate::domain::LoadedModel;
use crate::infrastructure::cache::CacheStatus;
use crate::infrastructure::services::{PredictionError, PredictionService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub prediction_service: Arc<dyn PredictionServiceTrait>,
}

impl AppState {
    pub fn new(prediction_service: Arc<dyn PredictionServiceTrait>) -> Self {
        Self { prediction_service }
    }
}

/// Trait for prediction service operations
#[async_trait::async_trait]
pub trait PredictionServiceTrait: Send + Sync {
    async fn predict(&self, rows: Vec<Value>) -> Result<Vec<f64>, PredictionError>;
    async fn reload(&self) -> Result<Arc<LoadedModel>, PredictionError>;
    fn status(&self) -> CacheStatus;
}

#[async_trait::async_trait]
impl PredictionServiceTrait for PredictionService {
    async fn predict(&self, rows: Vec<Value>) -> Result<Vec<f64>, PredictionError> {
        PredictionService::predict(self, rows).await
    }

    async fn reload(&self) -> Result<Arc<LoadedModel>, PredictionError> {
        PredictionService::reload(self).await
    }

    fn status(&self) -> CacheStatus {
        PredictionService::status(self)
    }
}
