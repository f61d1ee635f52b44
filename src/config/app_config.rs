use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole `/predict` call, model acquisition included
    pub predict_timeout_secs: u64,
    pub max_batch_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the model artifact lives
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactBackend {
    #[default]
    S3,
    Filesystem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub backend: ArtifactBackend,
    pub bucket: String,
    pub key: String,
    /// AWS region override; the default provider chain is used when unset
    pub region: Option<String>,
    /// Custom S3 endpoint (MinIO, LocalStack)
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    /// Root directory of the filesystem backend; objects live at `<root>/<bucket>/<key>`
    pub root: PathBuf,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Load the model during startup instead of on the first request
    pub preload: bool,
    /// Allow `POST /admin/model/reload`
    pub allow_reload: bool,
    /// Batches with more rows than this run on the blocking thread pool
    pub blocking_threshold_rows: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            predict_timeout_secs: 30,
            max_batch_rows: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            backend: ArtifactBackend::default(),
            bucket: "risk-appetite-classifier".to_string(),
            key: "xgboost_risk_appetite_model.json".to_string(),
            region: None,
            endpoint_url: None,
            force_path_style: false,
            root: PathBuf::from("artifacts"),
            fetch_timeout_secs: 60,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            preload: true,
            allow_reload: true,
            blocking_threshold_rows: 256,
        }
    }
}

impl ServerConfig {
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }
}

impl ArtifactConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
