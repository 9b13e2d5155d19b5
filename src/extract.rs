//! Upload classification and content extraction.
//!
//! Uploads are classified by filename suffix alone (case-insensitive); the
//! declared content-type of the multipart part is ignored. Extraction is
//! all-or-nothing per file: either the whole upload becomes an
//! [`Extracted`] value or an [`ExtractError`] is returned.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::models::Extracted;

/// Media-type prefix for every image upload. PNG is declared regardless of
/// the actual image subtype.
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Extraction error. Every variant is a client-side problem with the upload.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type.")]
    UnsupportedFileType,
    /// Carries the parser's own message for logging.
    #[error("Failed to extract text from PDF.")]
    Pdf(String),
    #[error("Text file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// File formats accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Image,
}

impl FileKind {
    /// Classifies a filename by suffix. Returns `None` for unsupported types.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".txt") {
            Some(FileKind::Text)
        } else if lower.ends_with(".pdf") {
            Some(FileKind::Pdf)
        } else if [".png", ".jpg", ".jpeg"]
            .iter()
            .any(|ext| lower.ends_with(ext))
        {
            Some(FileKind::Image)
        } else {
            None
        }
    }
}

/// Extracts the content of one uploaded file.
pub fn extract_upload(filename: &str, bytes: Vec<u8>) -> Result<Extracted, ExtractError> {
    match FileKind::from_filename(filename) {
        Some(FileKind::Text) => Ok(Extracted::Text(String::from_utf8(bytes)?)),
        Some(FileKind::Pdf) => extract_pdf(&bytes).map(Extracted::Text),
        Some(FileKind::Image) => Ok(Extracted::Image(image_data_uri(&bytes))),
        None => Err(ExtractError::UnsupportedFileType),
    }
}

/// Encodes raw image bytes as a `data:` URI.
pub fn image_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", IMAGE_DATA_URI_PREFIX, STANDARD.encode(bytes))
}

/// Extracts text page by page. A page whose text cannot be decoded
/// contributes an empty string; a document that cannot be loaded fails.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| {
        tracing::debug!(error = %e, "pdf could not be loaded");
        ExtractError::Pdf(e.to_string())
    })?;
    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| doc.extract_text(&[page_number]).ok());
    Ok(join_pages(pages))
}

/// Joins per-page text with newlines, substituting `""` for unreadable pages.
///
/// lopdf terminates each page with its own newline; exactly one is dropped
/// so pages are separated by a single `\n`.
fn join_pages(pages: impl IntoIterator<Item = Option<String>>) -> String {
    pages
        .into_iter()
        .map(|page| {
            let text = page.unwrap_or_default();
            match text.strip_suffix('\n') {
                Some(stripped) => stripped.to_owned(),
                None => text,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
