use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;
use time::OffsetDateTime;
use vekit_config::{Config, RuntimeEnv};
use vekit_core::SessionPrefix;
use vekit_storage::UploadOutcome;

use super::StorageContext;

pub async fn handle(
    config: &Config,
    env: RuntimeEnv,
    path: &Path,
    bucket: Option<String>,
    region: Option<String>,
    expires: Option<u64>,
) -> Result<ExitCode> {
    let session = SessionPrefix::resolve(env.session_id.as_deref(), OffsetDateTime::now_utc());
    let storage = StorageContext::resolve(config, env, bucket, region)?;
    let bucket = storage.bucket()?;
    let expires = expires.unwrap_or(storage.settings.expires_secs);

    let outcome = vekit_storage::upload_path(
        path,
        bucket,
        expires,
        &storage.tos,
        &storage.credentials,
        session,
    )
    .await?;

    if let UploadOutcome::Directory {
        uploaded, failed, ..
    } = &outcome
    {
        for failure in failed {
            eprintln!("  Skipped {}: {}", failure.path.display(), failure.reason);
        }
        eprintln!("Uploaded {} file(s), {} failed", uploaded.len(), failed.len());
    }

    println!("{}", outcome.location());
    Ok(ExitCode::SUCCESS)
}
