//! Text extraction: dispatch a saved document to the right format reader.
//!
//! Dispatch is by lowercase file extension only; content is never sniffed.

use crate::error::{ExtractionError, QuizError};
use crate::pipeline::{pdf, pptx};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Plain text, or why there is none.
pub type ExtractionResult = Result<String, ExtractionError>;

/// Supported document formats, inferred from the file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Pptx,
    /// Any other extension (lowercased), or empty when there is none.
    Other(String),
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "pptx" => DocumentKind::Pptx,
            _ => DocumentKind::Other(ext),
        }
    }
}

/// A saved upload, read once and discarded after extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = DocumentKind::from_path(&path);
        Self { path, kind }
    }

    /// Extract this document's text.
    pub fn extract(&self) -> ExtractionResult {
        info!("Extracting text from {} ({:?})", self.path.display(), self.kind);
        let text = match &self.kind {
            DocumentKind::Pdf => pdf::extract_pdf_text(&self.path)?,
            DocumentKind::Pptx => pptx::extract_pptx_text(&self.path)?,
            DocumentKind::Other(ext) => {
                return Err(ExtractionError::UnsupportedFormat {
                    extension: ext.clone(),
                })
            }
        };
        debug!("Extracted {} chars from {}", text.chars().count(), self.path.display());
        Ok(text)
    }
}

/// Extract plain text from the document at `path`.
pub fn extract(path: impl AsRef<Path>) -> ExtractionResult {
    Document::new(path.as_ref()).extract()
}

/// Run [`extract`] on the blocking thread pool.
///
/// The outer error is only for a panicked task; extraction failures stay in
/// the inner [`ExtractionResult`].
pub async fn extract_blocking(path: impl AsRef<Path>) -> Result<ExtractionResult, QuizError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || extract(&path))
        .await
        .map_err(|e| QuizError::Internal(format!("Extraction task panicked: {}", e)))
}
