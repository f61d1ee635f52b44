//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ArtifactBackend, ArtifactConfig, LogFormat, LoggingConfig, ModelConfig,
    ServerConfig,
};
