//! Inspect command - validate a local model artifact

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::api::types::FeatureSummary;
use crate::config::{AppConfig, LoggingConfig};
use crate::domain::content_digest;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::model::JsonModelDeserializer;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a JSON model artifact
    pub path: PathBuf,
}

/// What `inspect` prints on success
#[derive(Debug, Serialize)]
pub struct ArtifactReport {
    pub path: String,
    pub name: Option<String>,
    pub version: String,
    pub size_bytes: usize,
    pub objective: String,
    pub predictor: String,
    pub features: Vec<FeatureSummary>,
}

pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let logging = AppConfig::load()
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    init_logging(&logging);

    let report = inspect_file(&args.path).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

pub async fn inspect_file(path: &Path) -> anyhow::Result<ArtifactReport> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let (document, schema, predictor) = JsonModelDeserializer::parse(&bytes)
        .with_context(|| format!("{} is not a valid model artifact", path.display()))?;

    tracing::debug!(path = %path.display(), features = schema.len(), "Artifact validated");

    Ok(ArtifactReport {
        path: path.display().to_string(),
        name: document.name,
        version: content_digest(&bytes),
        size_bytes: bytes.len(),
        objective: document.objective.as_str().to_string(),
        predictor: predictor.describe(),
        features: schema.features().iter().map(Into::into).collect(),
    })
}
