//! Error envelope returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::services::PredictionError;

/// `{"error": "...", "code": "...", "row"?: n, "feature"?: "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: message.into(),
                code: code.into(),
                row: None,
                feature: None,
            },
        }
    }

    /// Point at the offending row
    pub fn with_row(mut self, row: usize) -> Self {
        self.response.row = Some(row);
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.response.feature = Some(feature.into());
        self
    }

    /// Malformed or unparseable request body
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        let status = match &err {
            PredictionError::Unavailable(e) if e.is_artifact_not_found() => StatusCode::NOT_FOUND,
            PredictionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PredictionError::Decode(_) | PredictionError::BatchTooLarge { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PredictionError::ReloadDisabled => StatusCode::FORBIDDEN,
        };

        let mut api_err = Self::new(status, err.code(), err.to_string());

        if let Some(row) = err.row() {
            api_err = api_err.with_row(row);
        }

        if let Some(feature) = err.feature() {
            api_err = api_err.with_feature(feature);
        }

        api_err
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.code, self.response.error)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::domain::{
        ArtifactError, ArtifactLocation, DecodeError, FeatureKind, InferenceError, ModelError,
        ModelUnavailable,
    };

    fn unavailable(cause: ModelError) -> PredictionError {
        PredictionError::Unavailable(ModelUnavailable::new(Arc::new(cause)))
    }

    #[test]
    fn test_missing_feature_envelope() {
        let err: ApiError = PredictionError::from(DecodeError::missing_feature(0, "b")).into();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.response.code, "missing_feature");
        assert_eq!(err.response.row, Some(0));
        assert_eq!(err.response.feature.as_deref(), Some("b"));
    }

    #[test]
    fn test_type_mismatch_envelope() {
        let err: ApiError =
            PredictionError::from(DecodeError::type_mismatch(4, "age", FeatureKind::Numeric))
                .into();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.response.code, "feature_type_mismatch");
        assert_eq!(err.response.row, Some(4));
    }

    #[test]
    fn test_model_unavailable_status_depends_on_cause() {
        let location = ArtifactLocation::new("bucket", "model.json");

        let not_found: ApiError =
            unavailable(ArtifactError::not_found(location.clone()).into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.response.code, "artifact_not_found");

        let transfer: ApiError =
            unavailable(ArtifactError::transfer(location, "reset").into()).into();
        assert_eq!(transfer.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(transfer.response.code, "model_unavailable");

        let corrupt: ApiError = unavailable(ModelError::deserialize("bad tree")).into();
        assert_eq!(corrupt.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_remaining_status_codes() {
        let cases = [
            (
                PredictionError::BatchTooLarge { rows: 5, limit: 2 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PredictionError::Inference(InferenceError::NonFinite { row: 1 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PredictionError::Timeout(Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (PredictionError::ReloadDisabled, StatusCode::FORBIDDEN),
        ];

        for (err, status) in cases {
            let api_err: ApiError = err.into();
            assert_eq!(api_err.status, status);
            assert!(api_err.response.row.is_none());
        }
    }

    #[test]
    fn test_envelope_omits_absent_fields() {
        let err = ApiError::invalid_request("missing field `features`");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["code"], "invalid_request");
        assert!(json.get("row").is_none());
        assert!(json.get("feature").is_none());
    }
}
