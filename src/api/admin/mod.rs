//! Admin API endpoints for the serving model

pub mod model;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/model", get(model::get_model_status))
        .route("/model/reload", post(model::reload_model))
}
