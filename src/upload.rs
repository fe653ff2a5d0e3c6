//! Upload Encoder
//!
//! Turns a selected local file into a transport-safe base64 payload and the
//! matching outgoing intent, for two attachment kinds: images and documents.
//!
//! Documents must actually be documents: the content type is checked from
//! the filename before any byte is read, and a mismatch is a validation
//! error returned to the caller - it never reaches the wire. Images carry
//! no precondition beyond being a file; the backend does its own vetting.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::intents::ClientIntent;
use crate::session::{AttachmentPreview, TimelineMessage};

/// The one content type accepted for document uploads
pub const DOCUMENT_MIME: &str = "application/pdf";

/// What kind of attachment is being uploaded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Image, analyzed by the backend's vision path
    Image,
    /// Document (PDF), processed by the backend's report path
    Document,
}

/// Validation and IO failures while preparing an upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// The path does not point at a regular file
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    /// A document upload was requested for a non-document file
    #[error("{} is not a document (expected {DOCUMENT_MIME})", .path.display())]
    NotADocument {
        /// The rejected path
        path: PathBuf,
    },
    /// Reading the file failed
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// The path that was being read
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// Check the preconditions for an upload without touching file contents
///
/// # Errors
///
/// Returns [`UploadError::NotAFile`] if the path is not a regular file, and
/// [`UploadError::NotADocument`] for a document upload whose content type
/// (guessed from the filename) is not [`DOCUMENT_MIME`].
pub fn validate(path: &Path, kind: AttachmentKind) -> Result<(), UploadError> {
    if !path.is_file() {
        return Err(UploadError::NotAFile(path.to_path_buf()));
    }
    if kind == AttachmentKind::Document {
        let mime = mime_guess::from_path(path).first_raw().unwrap_or("");
        if mime != DOCUMENT_MIME {
            return Err(UploadError::NotADocument {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Build the optimistic timeline message shown while encoding runs
///
/// Image placeholders carry a local preview reference; it stays on the
/// client and is never transmitted.
#[must_use]
pub fn placeholder(path: &Path, kind: AttachmentKind) -> TimelineMessage {
    match kind {
        AttachmentKind::Image => TimelineMessage::user("📷 Image uploaded".to_string())
            .with_attachment(AttachmentPreview::for_path(path)),
        AttachmentKind::Document => TimelineMessage::user("📄 Report uploaded".to_string()),
    }
}

/// Read and encode the file, producing the outgoing intent
///
/// The read is asynchronous; callers append the [`placeholder`] first so
/// the timeline gives immediate feedback while encoding runs.
///
/// # Errors
///
/// Returns the [`validate`] errors plus [`UploadError::Read`] if the file
/// cannot be read.
pub async fn encode(path: &Path, kind: AttachmentKind) -> Result<ClientIntent, UploadError> {
    validate(path, kind)?;

    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let encoded = BASE64.encode(bytes);

    Ok(match kind {
        AttachmentKind::Image => ClientIntent::UploadingFile { file: encoded },
        AttachmentKind::Document => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report.pdf".to_string());
            ClientIntent::UploadReportDirect {
                file_base64: encoded,
                filename,
                title: title_for(path),
            }
        }
    })
}

/// Derive a document title by stripping the filename's extension
fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled Report".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file_with(suffix: &str, contents: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let result = validate(Path::new("/no/such/file.png"), AttachmentKind::Image);
        assert!(matches!(result, Err(UploadError::NotAFile(_))));
    }

    #[test]
    fn test_validate_rejects_non_pdf_document() {
        let file = temp_file_with(".txt", b"plain text");
        let result = validate(file.path(), AttachmentKind::Document);
        assert!(matches!(result, Err(UploadError::NotADocument { .. })));
    }

    #[test]
    fn test_validate_accepts_pdf_document() {
        let file = temp_file_with(".pdf", b"%PDF-1.4");
        assert!(validate(file.path(), AttachmentKind::Document).is_ok());
    }

    #[test]
    fn test_image_has_no_type_precondition() {
        // Anything that is a file passes; the backend validates further
        let file = temp_file_with(".webp", b"RIFF");
        assert!(validate(file.path(), AttachmentKind::Image).is_ok());
    }

    #[tokio::test]
    async fn test_encode_image_is_base64_of_bytes() {
        let file = temp_file_with(".png", b"fake image bytes");
        let intent = encode(file.path(), AttachmentKind::Image).await.unwrap();

        let ClientIntent::UploadingFile { file: encoded } = intent else {
            panic!("wrong intent");
        };
        assert_eq!(encoded, BASE64.encode(b"fake image bytes"));
    }

    #[tokio::test]
    async fn test_encode_document_strips_extension_for_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blood-work.pdf");
        std::fs::write(&path, b"%PDF-1.4 report").unwrap();

        let intent = encode(&path, AttachmentKind::Document).await.unwrap();
        let ClientIntent::UploadReportDirect {
            file_base64,
            filename,
            title,
        } = intent
        else {
            panic!("wrong intent");
        };
        assert_eq!(filename, "blood-work.pdf");
        assert_eq!(title, "blood-work");
        assert_eq!(file_base64, BASE64.encode(b"%PDF-1.4 report"));
    }

    #[tokio::test]
    async fn test_encode_document_rejects_wrong_type_before_reading() {
        let file = temp_file_with(".txt", b"not a report");
        let result = encode(file.path(), AttachmentKind::Document).await;
        assert!(matches!(result, Err(UploadError::NotADocument { .. })));
    }

    #[test]
    fn test_image_placeholder_carries_preview() {
        let file = temp_file_with(".png", b"bytes");
        let message = placeholder(file.path(), AttachmentKind::Image);

        let preview = message.attachment.expect("preview expected");
        assert_eq!(preview.path, file.path());
        assert!(!message.in_progress);
    }

    #[test]
    fn test_document_placeholder_has_no_preview() {
        let file = temp_file_with(".pdf", b"%PDF");
        let message = placeholder(file.path(), AttachmentKind::Document);
        assert!(message.attachment.is_none());
    }
}
