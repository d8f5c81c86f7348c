//! Filesystem helpers: data-directory layout and attachment loading.

use std::path::{Path, PathBuf};

use pratai_core::attachment::{self, Attachment};
use pratai_types::error::AttachmentError;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PRATAI_DATA_DIR` environment variable
/// 2. `~/.pratai`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PRATAI_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".pratai");
    }

    PathBuf::from(".pratai")
}

/// Create the data directory if needed.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}

/// Read a local file as a validated PDF attachment.
///
/// Type and size are checked from the file name and metadata before the
/// contents are read.
pub async fn load_attachment(path: &Path) -> Result<Attachment, AttachmentError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = attachment::mime_for_file_name(&file_name);

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| AttachmentError::Read(format!("{}: {e}", path.display())))?;
    if !metadata.is_file() {
        return Err(AttachmentError::Read(format!(
            "{} is not a file",
            path.display()
        )));
    }
    attachment::check(mime, metadata.len())?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AttachmentError::Read(format!("{}: {e}", path.display())))?;
    tracing::debug!(file = %file_name, size = bytes.len(), "Attachment loaded");
    Attachment::new(file_name, mime, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pratai_core::attachment::MAX_ATTACHMENT_BYTES;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_small_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        tokio::fs::write(&path, b"%PDF-1.7 test").await.unwrap();

        let attachment = load_attachment(&path).await.unwrap();
        let (file_name, bytes) = attachment.into_parts();
        assert_eq!(file_name, "notes.pdf");
        assert_eq!(bytes, b"%PDF-1.7 test");
    }

    #[tokio::test]
    async fn test_rejects_oversize_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(15 * 1024 * 1024).unwrap();

        let err = load_attachment(&path).await.unwrap_err();
        assert_eq!(
            err,
            AttachmentError::TooLarge {
                size: 15 * 1024 * 1024,
                max: MAX_ATTACHMENT_BYTES
            }
        );
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"plain").await.unwrap();

        let err = load_attachment(&path).await.unwrap_err();
        assert!(matches!(err, AttachmentError::NotPdf { .. }));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_attachment(&dir.path().join("gone.pdf")).await.unwrap_err();
        assert!(matches!(err, AttachmentError::Read(_)));
    }

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
