//! Batch file download over HTTP(S)

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncWriteExt, BufWriter};
use vekit_core::{Error, Result};

/// Name used when the URL path has no usable last segment
pub const DEFAULT_FILENAME: &str = "downloaded_file";
/// Write buffer size for streamed bodies
pub const CHUNK_SIZE: usize = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vekit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Download every URL into `save_dir`, returning absolute paths in order
    ///
    /// The first failing URL aborts the batch; files already written stay.
    pub async fn download(
        &self,
        urls: &[String],
        save_dir: &Path,
        filenames: Option<&[String]>,
    ) -> Result<Vec<PathBuf>> {
        if let Some(names) = filenames {
            if names.len() != urls.len() {
                return Err(Error::Validation(format!(
                    "filename list length ({}) must match url list length ({})",
                    names.len(),
                    urls.len()
                )));
            }
        }

        let mut paths = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let name = filenames.map(|names| names[index].as_str());
            paths.push(self.download_one(url, save_dir, name).await?);
        }

        Ok(paths)
    }

    async fn download_one(&self, url: &str, save_dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(save_dir)
            .await
            .map_err(|e| write_error(save_dir, e))?;

        let name = match filename {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => filename_from_url(url),
        };
        let target = unique_path(save_dir, &name);

        tracing::info!(url, "downloading");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Download failed: HTTP error {}: {}",
                response.status().as_u16(),
                url
            )));
        }

        let file = tokio::fs::File::create(&target)
            .await
            .map_err(|e| write_error(&target, e))?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

        let written = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| Error::Network(format!("Download failed: {}", e)))?
            {
                writer
                    .write_all(&chunk)
                    .await
                    .map_err(|e| write_error(&target, e))?;
            }
            writer.flush().await.map_err(|e| write_error(&target, e))
        }
        .await;

        if let Err(e) = written {
            drop(writer);
            if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                tracing::warn!(path = %target.display(), error = %cleanup, "failed to remove partial download");
            }
            return Err(e);
        }

        let absolute = std::path::absolute(&target).map_err(|e| write_error(&target, e))?;
        tracing::info!(path = %absolute.display(), "downloaded");
        Ok(absolute)
    }
}

fn write_error(path: &Path, e: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("Write file failed: {}: {}", path.display(), e),
    ))
}

/// Percent-decoded last path segment of `url`, or [`DEFAULT_FILENAME`]
pub fn filename_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    };

    let decoded = urlencoding::decode(&segment)
        .map(|s| s.into_owned())
        .unwrap_or(segment);

    // A decoded `%2F` must not steer the file outside the save directory
    Path::new(&decoded)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// First free path among `name`, `stem_1.ext`, `stem_2.ext`, ...
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let original = Path::new(name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
