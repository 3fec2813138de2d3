//! Disk storage for event images.
//!
//! Files are written under the configured upload directory and referenced
//! from events by their public path, `uploads/<file>`, which is what the
//! router serves statically.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

/// URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "uploads";

const MAX_EXTENSION_LEN: usize = 10;

/// An image received with a request, not yet written to disk.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ImageStorage {
    dir: PathBuf,
}

impl ImageStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `data` to a fresh file and returns its public reference.
    pub async fn store(&self, original_name: Option<&str>, data: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = stored_file_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), data).await?;

        tracing::debug!(file = %file_name, bytes = data.len(), "Stored uploaded image");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }
}

/// `<millis>-<uuid>` plus the original extension when it looks sane.
fn stored_file_name(original_name: Option<&str>) -> String {
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple());
    match original_name.and_then(extension) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_kept_and_lowercased() {
        assert_eq!(extension("poster.PNG").as_deref(), Some("png"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
    }

    #[test]
    fn test_suspicious_extensions_are_dropped() {
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension("evil./../x"), None);
        assert_eq!(extension("file.abcdefghijklmnop"), None);
    }

    #[test]
    fn test_stored_names_are_unique() {
        let a = stored_file_name(Some("a.jpg"));
        let b = stored_file_name(Some("a.jpg"));
        assert_ne!(a, b);
        assert!(a.ends_with(".jpg"));
        assert!(!stored_file_name(None).contains('.'));
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_reference() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().join("nested"));

        let reference = storage.store(Some("poster.png"), b"png-bytes").await.unwrap();
        assert!(reference.starts_with("uploads/"));
        assert!(reference.ends_with(".png"));

        let file_name = reference.trim_start_matches("uploads/");
        let written = std::fs::read(storage.dir().join(file_name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }
}
