//! Object storage for vekit
//!
//! This crate contains:
//! - TOS V4 request signing and an HTTP client ([`TosClient`])
//! - The [`ObjectStore`] seam the upload logic is written against
//! - Credential resolution (explicit -> environment -> IAM)
//! - File/directory upload and frontend content publishing
//! - Skill packages (zip to TOS and back)

pub mod credentials;
pub mod publish;
pub mod signer;
pub mod skill;
pub mod store;
pub mod tos;
pub mod uploader;

#[cfg(test)]
pub mod memory;

use std::path::{Path, PathBuf};

pub use credentials::{
    CredentialChain, CredentialProvider, EnvironmentProvider, IamFileProvider, StaticProvider,
};
pub use publish::{ContentKind, Published, Publisher};
pub use skill::{
    SkillArchive, SkillPackage, SkillRegistry, extract_skill, package_skill, parse_tos_url,
    platform_bucket,
};
pub use store::{Acl, ObjectStore, PutObjectOutput, PutOptions, StorageClass, ensure_bucket};
pub use tos::{TosClient, TosConfig};
pub use uploader::{
    DEFAULT_EXPIRES_SECS, FailedUpload, PathKind, UploadOutcome, Uploader, inspect_path,
};

use vekit_core::{Result, SessionPrefix};

/// Upload a local file or directory to TOS
///
/// The path is checked before credentials are resolved or any request is
/// made. The client lives only for this call.
pub async fn upload_path(
    path: &Path,
    bucket: &str,
    expires_secs: u64,
    config: &TosConfig,
    credentials: &CredentialChain,
    session: SessionPrefix,
) -> Result<UploadOutcome> {
    uploader::validate_bucket(bucket)?;
    inspect_path(path)?;

    let credential = credentials.resolve()?;
    let client = TosClient::new(config, credential)?;
    let uploader = Uploader::new(client, session);

    uploader.upload(path, bucket, expires_secs).await
}

/// Publish a frontend snippet to TOS with a public-read ACL
pub async fn publish_content(
    content: &[u8],
    kind: ContentKind,
    bucket: &str,
    config: &TosConfig,
    credentials: &CredentialChain,
) -> Result<Published> {
    let credential = credentials.resolve()?;
    let client = TosClient::new(config, credential)?;

    Publisher::new(client).publish(bucket, content, kind).await
}

/// Zip a skill directory and upload it to `bucket`
pub async fn push_skill(
    dir: &Path,
    bucket: &str,
    config: &TosConfig,
    credentials: &CredentialChain,
) -> Result<SkillPackage> {
    inspect_path(dir)?;
    skill::skill_name(dir)?;

    let credential = credentials.resolve()?;
    let client = TosClient::new(config, credential)?;

    SkillRegistry::new(client)
        .push(dir, bucket, time::OffsetDateTime::now_utc())
        .await
}

/// Download a skill zip and extract it into `dest`
pub async fn fetch_skill(
    bucket: &str,
    key: &str,
    dest: &Path,
    name: Option<&str>,
    config: &TosConfig,
    credentials: &CredentialChain,
) -> Result<PathBuf> {
    let credential = credentials.resolve()?;
    let client = TosClient::new(config, credential)?;

    SkillRegistry::new(client).pull(bucket, key, dest, name).await
}
