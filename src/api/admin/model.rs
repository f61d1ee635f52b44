//! Model cache admin endpoints

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ModelStatusResponse};

/// GET /admin/model
pub async fn get_model_status(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    Json(state.prediction_service.status().into())
}

/// POST /admin/model/reload
///
/// Responds once the fresh load has resolved.
pub async fn reload_model(
    State(state): State<AppState>,
) -> Result<Json<ModelStatusResponse>, ApiError> {
    info!("Model reload requested");

    let model = state.prediction_service.reload().await?;

    info!(
        model = %model.identity().name,
        version = %model.identity().version,
        "Model reloaded"
    );

    Ok(Json(state.prediction_service.status().into()))
}
