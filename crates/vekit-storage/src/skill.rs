//! Skill packages
//!
//! A skill is a directory with a `SKILL.md` manifest. It travels as a zip
//! whose entries all live under `{skill_name}/`, stored in TOS at
//! `uploads/{YYYYMMDD_HHMMSS}/{skill_name}.zip`. Pulling a skill replaces the
//! local `{dest}/{skill_name}` directory with the archive contents.

use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use time::OffsetDateTime;
use vekit_core::{Error, ObjectKey, Result, SessionPrefix};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::store::{ObjectStore, PutOptions, ensure_bucket};
use crate::uploader::{PathKind, inspect_path, validate_bucket};

pub const SKILL_MANIFEST: &str = "SKILL.md";
pub const SKILL_UPLOAD_ROOT: &str = "uploads";
const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
    #[serde(default)]
    name: Option<String>,
}

/// A zipped skill held in memory
#[derive(Debug, Clone)]
pub struct SkillArchive {
    pub name: String,
    /// Entry names in archive order
    pub entries: Vec<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillPackage {
    pub name: String,
    pub object_key: String,
    pub tos_url: String,
}

/// `name` from the manifest frontmatter, else the directory name
pub fn skill_name(dir: &Path) -> Result<String> {
    let manifest = dir.join(SKILL_MANIFEST);
    if !manifest.is_file() {
        return Err(Error::Validation(format!(
            "Skill path '{}' has no {} file",
            dir.display(),
            SKILL_MANIFEST
        )));
    }

    let content = std::fs::read_to_string(&manifest)?;
    let declared = match frontmatter(&content) {
        Some(yaml) if !yaml.trim().is_empty() => {
            let parsed: SkillFrontmatter = serde_yaml::from_str(yaml).map_err(|e| {
                Error::Validation(format!(
                    "Failed to get skill name from {}: {}",
                    manifest.display(),
                    e
                ))
            })?;
            parsed.name
        }
        _ => None,
    };

    let name = match declared.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => std::path::absolute(dir)?
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .last()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Validation(format!("Cannot derive a skill name from {}", dir.display()))
            })?,
    };

    check_skill_name(&name)?;
    Ok(name)
}

/// Zip every non-hidden file under `dir` as `{name}/{relative_path}`
pub fn package_skill(dir: &Path) -> Result<SkillArchive> {
    if inspect_path(dir)? != PathKind::Directory {
        return Err(Error::Validation(format!(
            "Skill path '{}' is not a directory",
            dir.display()
        )));
    }
    let name = skill_name(dir)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.path().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::Validation(format!("{}: {}", entry.path().display(), e)))?;
        let entry_name = ObjectKey::for_directory_entry(&name, relative)?;
        let content = std::fs::read(entry.path())?;

        writer
            .start_file(entry_name.as_str(), options)
            .map_err(zip_error)?;
        writer.write_all(&content)?;
        entries.push(entry_name);
    }

    let bytes = writer.finish().map_err(zip_error)?.into_inner();
    tracing::info!(skill = %name, files = entries.len(), size = bytes.len(), "skill packaged");

    Ok(SkillArchive {
        name,
        entries,
        bytes,
    })
}

/// Unpack a skill zip into `dest`, replacing `dest/{name}`
///
/// The archive is checked before anything on disk is removed.
pub fn extract_skill(bytes: &[u8], dest: &Path, name: &str) -> Result<PathBuf> {
    check_skill_name(name)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        Error::Validation(format!("Downloaded file for '{}' is not a valid zip: {}", name, e))
    })?;

    std::fs::create_dir_all(dest)?;
    let target = dest.join(name);
    if target.is_dir() {
        std::fs::remove_dir_all(&target)?;
    } else if target.exists() {
        std::fs::remove_file(&target)?;
    }

    archive.extract(dest).map_err(zip_error)?;
    tracing::info!(skill = name, path = %target.display(), "skill extracted");

    Ok(target)
}

/// Bucket the platform keeps skill packages in for an account
pub fn platform_bucket(region: &str, account_id: &str) -> String {
    format!("agentkit-platform-{}-{}-skill", region, account_id)
}

/// Split `tos://bucket/key`
pub fn parse_tos_url(url: &str) -> Result<(String, String)> {
    url.strip_prefix("tos://")
        .and_then(|rest| rest.split_once('/'))
        .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
        .map(|(bucket, key)| (bucket.to_string(), key.to_string()))
        .ok_or_else(|| Error::Validation(format!("Not a tos://bucket/key URL: {}", url)))
}

/// Skill name implied by `…/{name}.zip`
pub fn skill_name_from_key(key: &str) -> Result<String> {
    let name = Path::new(key)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    check_skill_name(&name)?;
    Ok(name)
}

pub struct SkillRegistry<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> SkillRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Package `dir` and store it under `uploads/{timestamp}/{name}.zip`
    pub async fn push(&self, dir: &Path, bucket: &str, now: OffsetDateTime) -> Result<SkillPackage> {
        validate_bucket(bucket)?;
        let archive = package_skill(dir)?;
        let object_key = format!(
            "{}/{}/{}.zip",
            SKILL_UPLOAD_ROOT,
            SessionPrefix::timestamp(now),
            archive.name
        );

        ensure_bucket(&self.store, bucket).await?;

        let options = PutOptions {
            acl: None,
            content_type: Some(ZIP_CONTENT_TYPE.to_string()),
        };
        self.store
            .put_object(bucket, &object_key, archive.bytes, &options)
            .await?;

        let tos_url = format!("tos://{}/{}", bucket, object_key);
        tracing::info!(skill = %archive.name, tos_url = %tos_url, "skill uploaded");

        Ok(SkillPackage {
            name: archive.name,
            object_key,
            tos_url,
        })
    }

    /// Download `key` and extract it into `dest`; `name` defaults to the key's stem
    pub async fn pull(&self, bucket: &str, key: &str, dest: &Path, name: Option<&str>) -> Result<PathBuf> {
        validate_bucket(bucket)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => skill_name_from_key(key)?,
        };

        tracing::info!(skill = %name, bucket, key, "downloading skill");
        let bytes = self.store.get_object(bucket, key).await?;
        extract_skill(&bytes, dest, &name)
    }
}

/// Text between a leading `---` line and the next `---` line
fn frontmatter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Names become a directory and a zip prefix, so one plain component only
fn check_skill_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::Validation(format!("Invalid skill name: '{}'", name))),
    }
}

fn zip_error(e: zip::result::ZipError) -> Error {
    match e {
        zip::result::ZipError::Io(e) => Error::Io(e),
        other => Error::Validation(format!("Zip error: {}", other)),
    }
}
