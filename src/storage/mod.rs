//! Directory of uploaded PDF files.
//!
//! Uploads are stored under a freshly generated UUID, keeping the extension
//! of the client's original file name. Only the final path segment of a
//! stored name is ever joined onto the uploads directory.

use std::io;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Result of storing an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the uploads directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Write `data` under a new generated name.
    pub async fn save_pdf(&self, original_name: &str, data: &[u8]) -> io::Result<StoredFile> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_of(original_name));
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, data).await?;
        info!(file = %file_name, original = %original_name, size = data.len(), "Stored upload");

        Ok(StoredFile {
            file_name,
            size: data.len() as u64,
        })
    }

    /// Read a stored file. `Ok(None)` if it does not exist.
    pub async fn read(&self, stored_name: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(stored_name) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a stored file. Returns `Ok(false)` if there was nothing to delete.
    pub async fn remove(&self, stored_name: &str) -> io::Result<bool> {
        let Some(path) = self.resolve(stored_name) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed upload");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn resolve(&self, stored_name: &str) -> Option<PathBuf> {
        let name = stored_name.rsplit(&['/', '\\'][..]).next()?;
        if name.is_empty() || name == "." || name == ".." {
            return None;
        }
        Some(self.dir.join(name))
    }
}

/// Extension of the original file name, `pdf` when it has none.
fn extension_of(original_name: &str) -> String {
    let base = original_name.rsplit(&['/', '\\'][..]).next().unwrap_or("");
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_string()
        }
        _ => "pdf".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.pdf"), "pdf");
        assert_eq!(extension_of("archive.v2.PDF"), "PDF");
        assert_eq!(extension_of("noext"), "pdf");
        assert_eq!(extension_of("trailing."), "pdf");
        assert_eq!(extension_of("dir.d/file"), "pdf");
        assert_eq!(extension_of("weird.p/d"), "pdf");
    }

    #[tokio::test]
    async fn test_save_read_remove() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).await.unwrap();

        let stored = store.save_pdf("notes.pdf", b"%PDF-1.4 data").await.unwrap();
        assert!(stored.file_name.ends_with(".pdf"));
        assert_ne!(stored.file_name, "notes.pdf");
        assert_eq!(stored.size, 13);

        let data = store.read(&stored.file_name).await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"%PDF-1.4 data"[..]));

        // A prefixed path resolves to the same file
        let prefixed = format!("data/uploads/{}", stored.file_name);
        assert!(store.read(&prefixed).await.unwrap().is_some());

        assert!(store.remove(&stored.file_name).await.unwrap());
        assert!(!store.remove(&stored.file_name).await.unwrap());
        assert!(store.read(&stored.file_name).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_names_cannot_escape_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("secret.json"), b"{}").unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).await.unwrap();

        assert!(store.read("../secret.json").await.unwrap().is_none());
        assert!(store.read("..").await.unwrap().is_none());
        assert!(!store.remove("../secret.json").await.unwrap());
        assert!(dir.path().join("secret.json").exists());
    }
}
