//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

const CACHE_PHASES: [&str; 4] = ["empty", "loading", "ready", "failed"];

/// Label used for requests that matched no route
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Prometheus metrics");
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("model_serving_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    record_cache_phase("empty");
}

/// Create the metrics router, served at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric. `route` is the matched route template.
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(route)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of one `/predict` call.
///
/// `outcome` is `success` or the error code returned to the caller.
pub fn record_prediction(outcome: &'static str, rows: usize, duration: Duration) {
    counter!("predictions_total", "outcome" => outcome).increment(1);
    histogram!("prediction_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());

    if outcome == "success" {
        counter!("prediction_rows_total").increment(rows as u64);
    }
}

pub fn record_model_load(success: bool, duration: Duration) {
    let outcome = if success { "success" } else { "error" };

    counter!("model_loads_total", "outcome" => outcome).increment(1);
    histogram!("model_load_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

/// One series per phase; the current phase reads 1, the rest 0
pub fn record_cache_phase(current: &str) {
    for phase in CACHE_PHASES {
        let value = if phase == current { 1.0 } else { 0.0 };
        gauge!("model_cache_state", "state" => phase).set(value);
    }
}

/// Bound label cardinality
fn route_label(route: &str) -> String {
    if route.is_empty() {
        return UNMATCHED_ROUTE.to_string();
    }

    route.chars().take(50).collect()
}
