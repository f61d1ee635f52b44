//! Prediction service - acquire model, decode rows, run inference

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::features::decode;
use crate::domain::inference::predict;
use crate::domain::{DecodeError, InferenceError, LoadedModel, ModelUnavailable};
use crate::infrastructure::cache::{CacheStatus, ModelCache};
use crate::infrastructure::observability::record_prediction;

/// Anything that stops a batch from producing predictions
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Unavailable(#[from] ModelUnavailable),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Batch of {rows} rows exceeds the limit of {limit}")]
    BatchTooLarge { rows: usize, limit: usize },

    #[error("Prediction did not complete within {0:?}")]
    Timeout(Duration),

    #[error("Model reload is disabled")]
    ReloadDisabled,
}

impl PredictionError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(e) if e.is_artifact_not_found() => "artifact_not_found",
            Self::Unavailable(_) => "model_unavailable",
            Self::Decode(e) => e.kind(),
            Self::Inference(_) => "inference_error",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::Timeout(_) => "predict_timeout",
            Self::ReloadDisabled => "reload_disabled",
        }
    }

    /// Offending row, for decode failures
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Decode(e) => Some(e.row()),
            _ => None,
        }
    }

    pub fn feature(&self) -> Option<&str> {
        match self {
            Self::Decode(e) => e.feature(),
            _ => None,
        }
    }
}

/// Request limits applied by [`PredictionService`]
#[derive(Debug, Clone)]
pub struct PredictionSettings {
    pub max_batch_rows: usize,
    pub blocking_threshold_rows: usize,
    pub predict_timeout: Duration,
    pub allow_reload: bool,
}

impl PredictionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_batch_rows: config.server.max_batch_rows,
            blocking_threshold_rows: config.model.blocking_threshold_rows,
            predict_timeout: config.server.predict_timeout(),
            allow_reload: config.model.allow_reload,
        }
    }
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Batch prediction over the cached model.
///
/// A batch either yields one score per row, in row order, or fails as a whole.
/// Request failures never touch the cache state.
#[derive(Debug, Clone)]
pub struct PredictionService {
    cache: ModelCache,
    settings: PredictionSettings,
}

impl PredictionService {
    pub fn new(cache: ModelCache, settings: PredictionSettings) -> Self {
        Self { cache, settings }
    }

    /// Score a batch of feature rows
    pub async fn predict(&self, rows: Vec<Value>) -> Result<Vec<f64>, PredictionError> {
        let start = Instant::now();
        let row_count = rows.len();

        let result = if row_count > self.settings.max_batch_rows {
            Err(PredictionError::BatchTooLarge {
                rows: row_count,
                limit: self.settings.max_batch_rows,
            })
        } else {
            tokio::time::timeout(self.settings.predict_timeout, self.run(rows))
                .await
                .unwrap_or(Err(PredictionError::Timeout(self.settings.predict_timeout)))
        };

        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                debug!(
                    rows = row_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Batch scored"
                );
                record_prediction("success", row_count, elapsed);
            }
            Err(e) => {
                warn!(
                    kind = e.code(),
                    row = e.row(),
                    feature = e.feature(),
                    rows = row_count,
                    error = %e,
                    "Prediction failed"
                );
                record_prediction(e.code(), row_count, elapsed);
            }
        }

        result
    }

    async fn run(&self, rows: Vec<Value>) -> Result<Vec<f64>, PredictionError> {
        let model = self.cache.get_model().await?;

        if rows.len() <= self.settings.blocking_threshold_rows {
            return score(&model, &rows);
        }

        tokio::task::spawn_blocking(move || score(&model, &rows))
            .await
            .map_err(|e| InferenceError::predictor(format!("inference task failed: {}", e)))?
    }

    /// Load the model ahead of the first request
    pub async fn warm_up(&self) -> Result<Arc<LoadedModel>, PredictionError> {
        Ok(self.cache.get_model().await?)
    }

    /// Replace the serving model with a fresh load from the store
    pub async fn reload(&self) -> Result<Arc<LoadedModel>, PredictionError> {
        if !self.settings.allow_reload {
            return Err(PredictionError::ReloadDisabled);
        }

        Ok(self.cache.reload().await?)
    }

    pub fn status(&self) -> CacheStatus {
        self.cache.status()
    }
}

fn score(model: &LoadedModel, rows: &[Value]) -> Result<Vec<f64>, PredictionError> {
    let matrix = decode(rows, model.schema())?;
    Ok(predict(model, &matrix)?)
}
