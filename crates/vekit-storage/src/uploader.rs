//! File and directory upload with signed retrieval URLs

use std::path::{Path, PathBuf};

use vekit_core::{Error, ObjectKey, Result, SessionPrefix};

use crate::store::{ObjectStore, ensure_bucket};

/// Default signed-URL validity: 7 days
pub const DEFAULT_EXPIRES_SECS: u64 = 604_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Classify a local path without touching the network
pub fn inspect_path(path: &Path) -> Result<PathKind> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    if path.is_file() {
        Ok(PathKind::File)
    } else if path.is_dir() {
        Ok(PathKind::Directory)
    } else {
        Err(Error::Validation(format!(
            "Path is neither a file nor a directory: {}",
            path.display()
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of an upload; a directory reports its TOS path, not per-file URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    File {
        object_key: String,
        signed_url: String,
    },
    Directory {
        tos_path: String,
        uploaded: Vec<String>,
        failed: Vec<FailedUpload>,
    },
}

impl UploadOutcome {
    /// Signed URL for a file, `tos://` path for a directory
    pub fn location(&self) -> &str {
        match self {
            UploadOutcome::File { signed_url, .. } => signed_url,
            UploadOutcome::Directory { tos_path, .. } => tos_path,
        }
    }
}

/// Uploads local paths through an owned store handle
pub struct Uploader<S: ObjectStore> {
    store: S,
    session: SessionPrefix,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, session: SessionPrefix) -> Self {
        Self { store, session }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Dispatch on file vs directory
    pub async fn upload(&self, path: &Path, bucket: &str, expires_secs: u64) -> Result<UploadOutcome> {
        validate_bucket(bucket)?;
        match inspect_path(path)? {
            PathKind::File => self.upload_file(path, bucket, expires_secs).await,
            PathKind::Directory => self.upload_directory(path, bucket).await,
        }
    }

    /// Upload one file to `upload/{session}/{filename}` and sign a GET URL
    async fn upload_file(&self, path: &Path, bucket: &str, expires_secs: u64) -> Result<UploadOutcome> {
        let object_key = ObjectKey::for_file(&self.session, path)?;

        tracing::info!(path = %path.display(), bucket, key = %object_key, "starting file upload");
        ensure_bucket(&self.store, bucket).await?;

        let output = self.store.put_object_from_file(bucket, &object_key, path).await?;
        tracing::info!(key = %object_key, etag = ?output.etag, "file uploaded");

        let signed_url = self.store.presign_get(bucket, &object_key, expires_secs)?;
        tracing::info!(
            expires_secs,
            days = expires_secs / 86_400,
            "signed URL generated"
        );

        Ok(UploadOutcome::File {
            object_key,
            signed_url,
        })
    }

    /// Upload every regular file under `dir`, hidden ones included
    ///
    /// Per-file failures are logged and collected; the batch keeps going.
    async fn upload_directory(&self, dir: &Path, bucket: &str) -> Result<UploadOutcome> {
        let prefix = ObjectKey::for_directory(&self.session, dir)?;

        tracing::info!(path = %dir.display(), bucket, prefix = %prefix, "starting directory upload");
        ensure_bucket(&self.store, bucket).await?;

        let mut uploaded = Vec::new();
        let mut failed = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    tracing::error!(path = %path.display(), error = %e, "failed to read directory entry");
                    failed.push(FailedUpload {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let file = entry.path();
            // Links are not descended into, but a link that is not a directory
            // is uploaded like a file (a dangling one ends up in `failed`)
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && !file.is_dir());
            if !is_file {
                continue;
            }

            match self.upload_entry(dir, &prefix, bucket, file).await {
                Ok(key) => {
                    tracing::info!(path = %file.display(), key = %key, "uploaded");
                    uploaded.push(key);
                }
                Err(e) => {
                    tracing::error!(path = %file.display(), error = %e, "failed to upload");
                    failed.push(FailedUpload {
                        path: file.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let tos_path = format!("tos://{}/{}", bucket, prefix);
        tracing::info!(
            tos_path = %tos_path,
            uploaded = uploaded.len(),
            failed = failed.len(),
            "directory upload completed"
        );

        Ok(UploadOutcome::Directory {
            tos_path,
            uploaded,
            failed,
        })
    }

    async fn upload_entry(&self, root: &Path, prefix: &str, bucket: &str, file: &Path) -> Result<String> {
        let relative = file
            .strip_prefix(root)
            .map_err(|e| Error::Validation(format!("{}: {}", file.display(), e)))?;
        let key = ObjectKey::for_directory_entry(prefix, relative)?;
        self.store.put_object_from_file(bucket, &key, file).await?;
        Ok(key)
    }
}

pub(crate) fn validate_bucket(bucket: &str) -> Result<()> {
    if bucket.trim().is_empty() {
        return Err(Error::Validation("The bucket has not been specified".to_string()));
    }
    Ok(())
}
