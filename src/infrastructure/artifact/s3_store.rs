use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use bytes::Bytes;
use tracing::debug;

use crate::domain::{content_digest, Artifact, ArtifactError, ArtifactLocation, ArtifactStore};

#[cfg(test)]
use mockall::automock;

/// Object body and metadata returned by `GetObject`
#[derive(Debug, Clone)]
pub struct S3Object {
    pub bytes: Bytes,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}

/// Trait for S3 client operations (for mocking)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait S3ObjectClient: Send + Sync {
    async fn get_object(&self, location: &ArtifactLocation) -> Result<S3Object, ArtifactError>;
}

/// Real S3 client wrapper
#[derive(Debug, Clone)]
pub struct RealS3Client {
    client: S3Client,
}

impl RealS3Client {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS provider chain
    pub async fn from_env(
        region: Option<String>,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }

        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let shared = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(force_path_style)
            .build();

        Self::new(S3Client::from_conf(config))
    }
}

#[async_trait]
impl S3ObjectClient for RealS3Client {
    async fn get_object(&self, location: &ArtifactLocation) -> Result<S3Object, ArtifactError> {
        let output = self
            .client
            .get_object()
            .bucket(location.bucket())
            .key(location.key())
            .send()
            .await
            .map_err(|e| classify_get_object_error(location, e))?;

        let e_tag = output.e_tag().map(str::to_string);
        let version_id = output.version_id().map(str::to_string);

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| {
                ArtifactError::transfer(location.clone(), format!("failed to read object body: {}", e))
            })?
            .into_bytes();

        Ok(S3Object {
            bytes,
            e_tag,
            version_id,
        })
    }
}

/// Map SDK failures onto the artifact error taxonomy. A missing object or
/// bucket is `NotFound` and failing to reach S3 at all is `StoreUnavailable`.
/// Timeouts and everything else count as a failed transfer.
fn classify_get_object_error(
    location: &ArtifactLocation,
    error: SdkError<GetObjectError, HttpResponse>,
) -> ArtifactError {
    match &error {
        SdkError::ServiceError(service) => {
            if service.err().is_no_such_key() || service.raw().status().as_u16() == 404 {
                ArtifactError::not_found(location.clone())
            } else {
                ArtifactError::transfer(location.clone(), DisplayErrorContext(&error).to_string())
            }
        }
        SdkError::DispatchFailure(_) | SdkError::ConstructionFailure(_) => {
            ArtifactError::store_unavailable(DisplayErrorContext(&error).to_string())
        }
        _ => ArtifactError::transfer(location.clone(), DisplayErrorContext(&error).to_string()),
    }
}

/// Artifact store backed by S3 `GetObject`
pub struct S3ArtifactStore<C: S3ObjectClient> {
    client: C,
}

impl<C: S3ObjectClient> fmt::Debug for S3ArtifactStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3ArtifactStore").finish_non_exhaustive()
    }
}

impl S3ArtifactStore<RealS3Client> {
    pub async fn from_env(
        region: Option<String>,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> Self {
        Self::with_client(RealS3Client::from_env(region, endpoint_url, force_path_style).await)
    }
}

impl<C: S3ObjectClient> S3ArtifactStore<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: S3ObjectClient> ArtifactStore for S3ArtifactStore<C> {
    async fn fetch(&self, location: &ArtifactLocation) -> Result<Artifact, ArtifactError> {
        let start = Instant::now();
        let object = self.client.get_object(location).await?;

        let version = object
            .e_tag
            .as_deref()
            .map(|tag| tag.trim_matches('"').to_string())
            .filter(|tag| !tag.is_empty())
            .or(object.version_id)
            .unwrap_or_else(|| content_digest(&object.bytes));

        debug!(
            location = %location,
            version = %version,
            bytes = object.bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched artifact from S3"
        );

        Ok(Artifact::new(location.clone(), version, object.bytes))
    }

    fn store_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::error::{InvalidObjectState, NoSuchKey};
    use aws_smithy_runtime_api::client::result::ConnectorError;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use mockall::predicate::eq;

    fn location() -> ArtifactLocation {
        ArtifactLocation::new("risk-appetite-classifier", "xgboost_risk_appetite_model.json")
    }

    #[tokio::test]
    async fn test_fetch_uses_etag_as_version() {
        let mut client = MockS3ObjectClient::new();
        client
            .expect_get_object()
            .with(eq(location()))
            .times(1)
            .returning(|_| {
                Ok(S3Object {
                    bytes: Bytes::from_static(b"{}"),
                    e_tag: Some("\"9b2cf535f27731c974343645a3985328\"".to_string()),
                    version_id: Some("v7".to_string()),
                })
            });

        let store = S3ArtifactStore::with_client(client);
        let artifact = store.fetch(&location()).await.unwrap();

        assert_eq!(artifact.version(), "9b2cf535f27731c974343645a3985328");
        assert_eq!(artifact.bytes().as_ref(), b"{}");
        assert_eq!(artifact.location(), &location());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_version_id_then_digest() {
        let mut client = MockS3ObjectClient::new();
        client.expect_get_object().times(1).returning(|_| {
            Ok(S3Object {
                bytes: Bytes::from_static(b"model"),
                e_tag: None,
                version_id: Some("v7".to_string()),
            })
        });
        let artifact = S3ArtifactStore::with_client(client).fetch(&location()).await.unwrap();
        assert_eq!(artifact.version(), "v7");

        let mut client = MockS3ObjectClient::new();
        client.expect_get_object().times(1).returning(|_| {
            Ok(S3Object {
                bytes: Bytes::from_static(b"model"),
                e_tag: None,
                version_id: None,
            })
        });
        let artifact = S3ArtifactStore::with_client(client).fetch(&location()).await.unwrap();
        assert_eq!(artifact.version(), content_digest(b"model"));
    }

    #[tokio::test]
    async fn test_fetch_propagates_client_errors() {
        let mut client = MockS3ObjectClient::new();
        client
            .expect_get_object()
            .returning(|location| Err(ArtifactError::not_found(location.clone())));

        let err = S3ArtifactStore::with_client(client)
            .fetch(&location())
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    fn raw_response(status: u16) -> HttpResponse {
        HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::empty())
    }

    #[test]
    fn test_timeout_is_transfer_error() {
        let err = classify_get_object_error(
            &location(),
            SdkError::timeout_error("operation timed out"),
        );

        assert!(matches!(err, ArtifactError::Transfer { .. }));
        assert_eq!(err.kind(), "artifact_transfer_error");
    }

    #[test]
    fn test_no_such_key_is_not_found() {
        let err = classify_get_object_error(
            &location(),
            SdkError::service_error(
                GetObjectError::NoSuchKey(NoSuchKey::builder().build()),
                raw_response(404),
            ),
        );

        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[test]
    fn test_other_service_error_is_transfer_error() {
        let err = classify_get_object_error(
            &location(),
            SdkError::service_error(
                GetObjectError::InvalidObjectState(InvalidObjectState::builder().build()),
                raw_response(403),
            ),
        );

        assert!(matches!(err, ArtifactError::Transfer { .. }));
    }

    #[test]
    fn test_dispatch_failure_is_store_unavailable() {
        let err = classify_get_object_error(
            &location(),
            SdkError::dispatch_failure(ConnectorError::io("connection refused".into())),
        );

        assert!(matches!(err, ArtifactError::StoreUnavailable { .. }));
    }
}
