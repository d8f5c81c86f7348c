//! Local validation of PDF attachments.
//!
//! Attachments are checked before any upload: wrong type or oversize files
//! never reach the backend.

use pratai_types::error::AttachmentError;

/// Largest accepted attachment (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// The only accepted MIME type.
pub const PDF_MIME: &str = "application/pdf";

/// A validated PDF, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Validate and wrap file contents.
    pub fn new(
        file_name: impl Into<String>,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        check(mime, bytes.len() as u64)?;
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.file_name, self.bytes)
    }
}

/// Check type and size without holding the contents.
///
/// Lets callers reject a file from its metadata before reading it.
pub fn check(mime: &str, size: u64) -> Result<(), AttachmentError> {
    if !mime.eq_ignore_ascii_case(PDF_MIME) {
        return Err(AttachmentError::NotPdf {
            mime: mime.to_string(),
        });
    }
    if size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            size,
            max: MAX_ATTACHMENT_BYTES,
        });
    }
    Ok(())
}

/// MIME type for a local file name, by extension.
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "txt" | "md" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_small_pdf() {
        let attachment = Attachment::new("notes.pdf", PDF_MIME, b"%PDF-1.7".to_vec()).unwrap();
        let (file_name, bytes) = attachment.into_parts();
        assert_eq!(file_name, "notes.pdf");
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = Attachment::new("notes.txt", "text/plain", b"hello".to_vec()).unwrap_err();
        assert_eq!(
            err,
            AttachmentError::NotPdf {
                mime: "text/plain".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_oversize() {
        let size = 15 * 1024 * 1024;
        let err = check(PDF_MIME, size).unwrap_err();
        assert_eq!(
            err,
            AttachmentError::TooLarge {
                size,
                max: MAX_ATTACHMENT_BYTES
            }
        );
    }

    #[test]
    fn test_limit_is_inclusive() {
        assert!(check(PDF_MIME, MAX_ATTACHMENT_BYTES).is_ok());
        assert!(check(PDF_MIME, MAX_ATTACHMENT_BYTES + 1).is_err());
    }

    #[test]
    fn test_mime_for_file_name() {
        assert_eq!(mime_for_file_name("Report.PDF"), PDF_MIME);
        assert_eq!(mime_for_file_name("notes.txt"), "text/plain");
        assert_eq!(mime_for_file_name("no_extension"), "application/octet-stream");
    }
}
