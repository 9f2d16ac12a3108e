//! Deterministic object-key construction
//!
//! Uploaded objects are namespaced by a session prefix:
//! - file: `upload/{session_prefix}/{filename}`
//! - directory: `upload/{session_prefix}/{directory_name}/{relative_path}`

use std::fmt;
use std::path::{Component, Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::{Error, Result};

/// Root segment for all uploaded objects
pub const UPLOAD_ROOT: &str = "upload";

/// Segment identifying a logical user session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrefix(String);

impl SessionPrefix {
    /// Use the session id when present, else a second-precision timestamp
    pub fn resolve(session_id: Option<&str>, now: OffsetDateTime) -> Self {
        match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::timestamp(now),
        }
    }

    /// `%Y%m%d_%H%M%S` rendering of `now`
    pub fn timestamp(now: OffsetDateTime) -> Self {
        let format = format_description!("[year][month][day]_[hour][minute][second]");
        // The format has no fallible components for a valid OffsetDateTime.
        let rendered = now
            .format(&format)
            .unwrap_or_else(|_| now.unix_timestamp().to_string());
        Self(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object-key builders
pub struct ObjectKey;

impl ObjectKey {
    /// Key for a single uploaded file
    pub fn for_file(prefix: &SessionPrefix, file: &Path) -> Result<String> {
        let name = file_name(file)?;
        Ok(format!("{}/{}/{}", UPLOAD_ROOT, prefix, name))
    }

    /// Key prefix shared by every file of an uploaded directory
    ///
    /// The name is taken lexically (`./out/` and `a/../out` both give `out`);
    /// a symlinked directory keeps the link's name.
    pub fn for_directory(prefix: &SessionPrefix, dir: &Path) -> Result<String> {
        let absolute = std::path::absolute(dir)?;
        let name = file_name(&normalize(&absolute))?;
        Ok(format!("{}/{}/{}", UPLOAD_ROOT, prefix, name))
    }

    /// Key for a file inside an uploaded directory; separators are always `/`
    pub fn for_directory_entry(dir_prefix: &str, relative: &Path) -> Result<String> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::Validation(format!(
                        "Relative path escapes directory: {}",
                        relative.display()
                    )));
                }
            }
        }

        if segments.is_empty() {
            return Err(Error::Validation("Empty relative path".to_string()));
        }

        Ok(format!("{}/{}", dir_prefix, segments.join("/")))
    }

    /// Key for published frontend content: `frontend/{unix_ts}_{id}.{ext}`
    pub fn for_frontend(unix_ts: i64, id: &str, extension: &str) -> String {
        format!("frontend/{}_{}.{}", unix_ts, id, extension)
    }
}

/// Drop `.` and resolve `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Validation(format!("Path has no file name: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_prefix_prefers_session_id() {
        let now = datetime!(2025-12-10 15:00:57 UTC);
        let prefix = SessionPrefix::resolve(Some("tmp-session-42"), now);
        assert_eq!(prefix.as_str(), "tmp-session-42");
    }

    #[test]
    fn test_prefix_falls_back_to_timestamp() {
        let now = datetime!(2025-12-10 15:00:57 UTC);
        assert_eq!(SessionPrefix::resolve(None, now).as_str(), "20251210_150057");
        assert_eq!(SessionPrefix::resolve(Some("  "), now).as_str(), "20251210_150057");
    }

    #[test]
    fn test_file_key() {
        let prefix = SessionPrefix::resolve(Some("s1"), OffsetDateTime::UNIX_EPOCH);
        let key = ObjectKey::for_file(&prefix, Path::new("/data/report.pdf")).unwrap();
        assert_eq!(key, "upload/s1/report.pdf");
    }

    #[test]
    fn test_directory_keys() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("outputs");
        std::fs::create_dir(&dir).unwrap();

        let prefix = SessionPrefix::resolve(Some("s1"), OffsetDateTime::UNIX_EPOCH);
        let dir_prefix = ObjectKey::for_directory(&prefix, &dir).unwrap();
        assert_eq!(dir_prefix, "upload/s1/outputs");

        let entry = ObjectKey::for_directory_entry(&dir_prefix, Path::new("a/b.txt")).unwrap();
        assert_eq!(entry, "upload/s1/outputs/a/b.txt");
    }

    #[test]
    fn test_directory_name_is_lexical() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("outputs")).unwrap();
        let prefix = SessionPrefix::resolve(Some("s1"), OffsetDateTime::UNIX_EPOCH);

        let dotted = temp.path().join("other/../outputs/.");
        assert_eq!(
            ObjectKey::for_directory(&prefix, &dotted).unwrap(),
            "upload/s1/outputs"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_keeps_link_name() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("real")).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("real"), &link).unwrap();

        let prefix = SessionPrefix::resolve(Some("s1"), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(
            ObjectKey::for_directory(&prefix, &link).unwrap(),
            "upload/s1/link"
        );
    }

    #[test]
    fn test_directory_entry_rejects_parent_components() {
        let result = ObjectKey::for_directory_entry("upload/s1/d", Path::new("../x"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_frontend_key() {
        assert_eq!(
            ObjectKey::for_frontend(1700000000, "ab12cd34", "html"),
            "frontend/1700000000_ab12cd34.html"
        );
    }
}
