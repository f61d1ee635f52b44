//! Batch prediction endpoint

use axum::extract::State;

use super::state::AppState;
use super::types::{ApiError, Json, PredictRequest, PredictResponse};

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let predictions = state.prediction_service.predict(request.features).await?;

    Ok(Json(PredictResponse { predictions }))
}
