//! Credential resolution
//!
//! Providers are tried in order; the first one that yields a credential wins.
//! A provider error is logged and the chain moves on.

use std::path::PathBuf;

use serde::Deserialize;
use vekit_core::{Credential, Error, Result};

pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when this source is not configured
    fn provide(&self) -> Result<Option<Credential>>;
}

/// Keys passed explicitly by the caller
pub struct StaticProvider {
    credential: Option<Credential>,
}

impl StaticProvider {
    pub fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }
}

impl CredentialProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn provide(&self) -> Result<Option<Credential>> {
        Ok(self.credential.clone())
    }
}

/// Keys captured from `VOLCENGINE_ACCESS_KEY` / `VOLCENGINE_SECRET_KEY`
pub struct EnvironmentProvider {
    access_key: Option<String>,
    secret_key: Option<String>,
}

impl EnvironmentProvider {
    pub fn new(access_key: Option<String>, secret_key: Option<String>) -> Self {
        Self {
            access_key,
            secret_key,
        }
    }
}

impl CredentialProvider for EnvironmentProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn provide(&self) -> Result<Option<Credential>> {
        Ok(Credential::from_parts(
            self.access_key.as_deref(),
            self.secret_key.as_deref(),
            None,
        ))
    }
}

#[derive(Deserialize)]
struct IamCredentialFile {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    session_token: Option<String>,
}

/// Temporary credentials the function platform mounts for the IAM role
pub struct IamFileProvider {
    path: PathBuf,
}

impl IamFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for IamFileProvider {
    fn name(&self) -> &'static str {
        "iam"
    }

    fn provide(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let file: IamCredentialFile = serde_json::from_str(&content)?;

        Ok(Credential::from_parts(
            Some(&file.access_key_id),
            Some(&file.secret_access_key),
            file.session_token.as_deref(),
        ))
    }
}

pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// explicit -> environment -> IAM
    pub fn standard(
        explicit: Option<Credential>,
        env_access_key: Option<String>,
        env_secret_key: Option<String>,
        iam_path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(vec![
            Box::new(StaticProvider::new(explicit)),
            Box::new(EnvironmentProvider::new(env_access_key, env_secret_key)),
            Box::new(IamFileProvider::new(iam_path)),
        ])
    }

    pub fn resolve(&self) -> Result<Credential> {
        for provider in &self.providers {
            match provider.provide() {
                Ok(Some(credential)) => {
                    tracing::debug!(source = provider.name(), "credentials resolved");
                    return Ok(credential);
                }
                Ok(None) => {
                    tracing::debug!(source = provider.name(), "no credentials from source");
                }
                Err(e) => {
                    tracing::warn!(source = provider.name(), error = %e, "credential source failed");
                }
            }
        }

        Err(Error::Credential(
            "VOLCENGINE_ACCESS_KEY and VOLCENGINE_SECRET_KEY are not provided or IAM Role is not configured"
                .to_string(),
        ))
    }
}
