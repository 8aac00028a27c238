//! Document attachment validation and staging.
//!
//! Only formats the document-processing backend can OCR are accepted, and
//! only one document per submission.

use crate::message::AttachmentRef;
use base64::Engine;
use std::path::Path;
use thiserror::Error;

/// Largest document accepted for upload (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Canonical MIME types accepted for upload.
pub const ACCEPTED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/tiff", "application/pdf"];

/// Non-canonical spellings browsers report, mapped to the canonical type.
const MIME_ALIASES: &[(&str, &str)] = &[("image/jpg", "image/jpeg")];

/// File extensions and their media types, for staging from disk.
const SUPPORTED_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("pdf", "application/pdf"),
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported document type: {0}. Use JPEG, PNG, PDF, or TIFF")]
    InvalidType(String),

    #[error("Document too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What the host knows about a selected file before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Check a candidate against the type allow-list and size ceiling.
pub fn validate(file: &FileCandidate) -> Result<AttachmentRef, ValidationError> {
    let mime_type = canonical_mime(&file.mime_type)
        .ok_or_else(|| ValidationError::InvalidType(file.mime_type.clone()))?;

    if file.size_bytes > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::TooLarge {
            size: file.size_bytes,
            max: MAX_ATTACHMENT_BYTES,
        });
    }

    Ok(AttachmentRef {
        name: file.name.clone(),
        size_bytes: file.size_bytes,
        mime_type: mime_type.to_string(),
        remote_url: None,
    })
}

/// Validate a file-picker selection.
///
/// An empty selection yields `None`. Only the first file is considered.
pub fn validate_selection(files: &[FileCandidate]) -> Option<Result<AttachmentRef, ValidationError>> {
    files.first().map(validate)
}

fn canonical_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.trim().to_ascii_lowercase();
    if let Some((_, canonical)) = MIME_ALIASES.iter().find(|(alias, _)| *alias == mime) {
        return Some(*canonical);
    }
    ACCEPTED_MIME_TYPES.iter().copied().find(|m| *m == mime)
}

/// A validated document with its bytes, held only until it is transmitted.
#[derive(Clone)]
pub struct StagedDocument {
    attachment: AttachmentRef,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for StagedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedDocument")
            .field("attachment", &self.attachment)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl StagedDocument {
    /// Stage bytes the host already holds (e.g. from a browser file reader).
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let candidate = FileCandidate::new(name, bytes.len() as u64, mime_type);
        let attachment = validate(&candidate)?;
        Ok(Self { attachment, bytes })
    }

    #[must_use]
    pub fn attachment(&self) -> &AttachmentRef {
        &self.attachment
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.attachment.mime_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard base64 of the document bytes, as the upload endpoint expects.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Stage a document from disk.
///
/// The type comes from the extension and the size is checked BEFORE the file
/// is read, so oversized files are never loaded.
pub fn stage_file(path: &Path) -> Result<StagedDocument, StageError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mime_type = SUPPORTED_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mt)| *mt)
        .ok_or_else(|| ValidationError::InvalidType(format!(".{ext}")))?;

    let io_err = |source| StageError::Io {
        path: path.display().to_string(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(io_err)?;
    let attachment = validate(&FileCandidate::new(name, metadata.len(), mime_type))?;

    let bytes = std::fs::read(path).map_err(io_err)?;
    // The file may have grown between stat and read
    if bytes.len() as u64 > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::TooLarge {
            size: bytes.len() as u64,
            max: MAX_ATTACHMENT_BYTES,
        }
        .into());
    }

    Ok(StagedDocument {
        attachment: AttachmentRef {
            size_bytes: bytes.len() as u64,
            ..attachment
        },
        bytes,
    })
}
