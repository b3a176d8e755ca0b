//! PDF text extraction via `lopdf`.
//!
//! Pages are read in page-number order and their text concatenated with no
//! separator. Corrupt and encrypted files both surface as
//! [`ExtractionError::UnreadablePdf`], whose user-facing message is fixed;
//! the parser detail only goes to the log.

use crate::error::ExtractionError;
use lopdf::Document;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the text of every page of the PDF at `path`.
pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = Document::load_from(BufReader::new(file))
        .map_err(|e| unreadable(path, format!("parse failed: {e}")))?;

    if document.is_encrypted() {
        return Err(unreadable(path, "document is encrypted".to_string()));
    }

    let pages = document.get_pages();
    debug!("PDF {} has {} pages", path.display(), pages.len());

    let mut text = String::new();
    let mut failed_pages = 0usize;
    for page_num in pages.keys() {
        match document.extract_text(&[*page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                warn!("Page {} of {}: text extraction failed: {}", page_num, path.display(), e);
                failed_pages += 1;
            }
        }
    }

    if !pages.is_empty() && failed_pages == pages.len() {
        return Err(unreadable(
            path,
            format!("text extraction failed on all {failed_pages} pages"),
        ));
    }

    Ok(text)
}

fn unreadable(path: &Path, detail: String) -> ExtractionError {
    warn!("Unreadable PDF {}: {}", path.display(), detail);
    ExtractionError::UnreadablePdf {
        path: path.to_path_buf(),
        detail,
    }
}
