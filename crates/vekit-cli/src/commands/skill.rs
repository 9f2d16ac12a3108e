use anyhow::Result;
use std::process::ExitCode;
use vekit_config::{Config, RuntimeEnv};
use vekit_storage::{parse_tos_url, platform_bucket};

use super::StorageContext;
use crate::cli::SkillCommands;

pub async fn handle(cmd: SkillCommands, config: &Config, env: RuntimeEnv) -> Result<ExitCode> {
    match cmd {
        SkillCommands::Push {
            path,
            bucket,
            account_id,
            region,
        } => {
            let storage = StorageContext::resolve(config, env, bucket, region)?;
            let bucket = match &account_id {
                Some(id) => platform_bucket(&storage.settings.region, id),
                None => storage.bucket()?.to_string(),
            };

            let package =
                vekit_storage::push_skill(&path, &bucket, &storage.tos, &storage.credentials)
                    .await?;

            eprintln!("Uploaded skill '{}'", package.name);
            println!("{}", package.tos_url);
        }
        SkillCommands::Pull {
            url,
            dest,
            name,
            region,
        } => {
            let (bucket, key) = parse_tos_url(&url)?;
            let storage = StorageContext::resolve(config, env, None, region)?;

            let extracted = vekit_storage::fetch_skill(
                &bucket,
                &key,
                &dest,
                name.as_deref(),
                &storage.tos,
                &storage.credentials,
            )
            .await?;

            println!("{}", extracted.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
