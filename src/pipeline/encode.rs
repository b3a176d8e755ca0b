//! Background image encoding: uploaded image → `data:` URI.
//!
//! The rendered quiz is a single self-contained HTML file, so the background
//! is inlined as base64 rather than linked. Anything that is not recognisably
//! an image degrades to [`Background::None`] and the quiz renders without one;
//! a bad background never fails the request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::Path;
use tracing::{debug, warn};

/// Optional page background for the rendered quiz.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Background {
    /// No background (missing, empty, unreadable or non-image upload).
    #[default]
    None,
    /// An inline image.
    Image { mime: String, data_uri: String },
}

impl Background {
    pub fn data_uri(&self) -> Option<&str> {
        match self {
            Background::None => None,
            Background::Image { data_uri, .. } => Some(data_uri),
        }
    }
}

/// Infer an `image/*` MIME type from the filename extension.
pub fn image_mime_type(filename: &str) -> Option<&'static str> {
    let mime = ImageFormat::from_path(filename).ok()?.to_mime_type();
    mime.starts_with("image/").then_some(mime)
}

/// Encode an uploaded image as a background.
///
/// Returns [`Background::None`] when the filename is empty, its extension does
/// not map to an image type, or the content is empty.
pub fn encode_background(filename: &str, bytes: &[u8]) -> Background {
    if filename.trim().is_empty() {
        return Background::None;
    }
    let Some(mime) = image_mime_type(filename) else {
        debug!("Ignoring background '{}': not an image type", filename);
        return Background::None;
    };
    if bytes.is_empty() {
        debug!("Ignoring background '{}': empty upload", filename);
        return Background::None;
    }

    let b64 = STANDARD.encode(bytes);
    debug!("Encoded background {} → {} bytes base64", filename, b64.len());

    Background::Image {
        mime: mime.to_string(),
        data_uri: format!("data:{mime};base64,{b64}"),
    }
}

/// Read and encode an image file from disk. Read failures degrade to
/// [`Background::None`].
pub fn encode_background_file(path: &Path) -> Background {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if image_mime_type(&filename).is_none() {
        return Background::None;
    }
    match std::fs::read(path) {
        Ok(bytes) => encode_background(&filename, &bytes),
        Err(e) => {
            warn!("Could not read background {}: {}", path.display(), e);
            Background::None
        }
    }
}
