use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use vekit_config::{Config, RuntimeEnv};
use vekit_storage::ContentKind;

use super::StorageContext;

pub async fn handle(
    config: &Config,
    env: RuntimeEnv,
    file: &Path,
    kind: &str,
    bucket: Option<String>,
) -> Result<ExitCode> {
    // Reject the type before touching the file or the network
    let kind = ContentKind::parse(kind)?;
    let content = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let storage = StorageContext::resolve(config, env, bucket, None)?;
    let published = vekit_storage::publish_content(
        &content,
        kind,
        storage.bucket()?,
        &storage.tos,
        &storage.credentials,
    )
    .await?;

    tracing::info!(key = %published.object_key, "published");
    println!("{}", published.url);
    Ok(ExitCode::SUCCESS)
}
