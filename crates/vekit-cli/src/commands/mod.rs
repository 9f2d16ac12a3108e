pub mod download;
pub mod publish;
pub mod redact;
pub mod screen;
pub mod skill;
pub mod upload;

use anyhow::{Context, Result};
use std::io::Read;
use vekit_config::{Config, RuntimeEnv, StorageSettings};
use vekit_storage::{CredentialChain, TosConfig};

/// Use the argument if given, otherwise read all of stdin
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Storage endpoint, region and credentials with CLI flags applied over the environment
pub struct StorageContext {
    pub settings: StorageSettings,
    pub tos: TosConfig,
    pub credentials: CredentialChain,
}

impl StorageContext {
    pub fn resolve(
        config: &Config,
        mut env: RuntimeEnv,
        bucket: Option<String>,
        region: Option<String>,
    ) -> Result<Self> {
        if bucket.is_some() {
            env.bucket = bucket;
        }
        if region.is_some() {
            env.region = region;
        }

        let settings = config.storage_settings(&env)?;
        let tos = TosConfig::new(settings.endpoint.clone(), settings.region.clone())
            .with_path_style(settings.path_style);
        let credentials = CredentialChain::standard(
            None,
            env.access_key.clone(),
            env.secret_key.clone(),
            settings.iam_credential_path.clone(),
        );

        Ok(Self {
            settings,
            tos,
            credentials,
        })
    }

    pub fn bucket(&self) -> Result<&str> {
        self.settings.bucket.as_deref().context(
            "No bucket specified: pass --bucket or set DATABASE_TOS_BUCKET",
        )
    }
}
