//! Upload handling: sanitise client filenames, save uploads, name outputs.
//!
//! Client-supplied filenames are never trusted as paths. They are reduced to a
//! plain ASCII basename before being joined onto the upload directory, so an
//! upload named `../../etc/passwd` lands as `etc_passwd`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of rendered quiz files.
pub const OUTPUT_PREFIX: &str = "test_";

/// Fallback name when sanitising leaves nothing.
const FALLBACK_NAME: &str = "upload";

static RE_UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a client filename to a safe basename.
///
/// Path separators become spaces, runs of whitespace become a single `_`,
/// every character outside `[A-Za-z0-9_.-]` is dropped (accented letters lose
/// their accent), and leading/trailing `.`/`_` are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name.chars().map(fold_accent).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = RE_UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

/// Where the rendered quiz for `upload_name` is written: `test_<stem>.html`
/// inside `dir`.
pub fn quiz_output_path(dir: &Path, upload_name: &str) -> PathBuf {
    dir.join(quiz_output_name(upload_name))
}

/// File name of the rendered quiz for `upload_name`.
pub fn quiz_output_name(upload_name: &str) -> String {
    let stem = Path::new(upload_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    format!("{OUTPUT_PREFIX}{stem}.html")
}

/// Save an uploaded document under its sanitised name inside `dir`.
///
/// An existing file with the same name is overwritten.
pub async fn save_upload(dir: &Path, filename: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(sanitize_filename(filename));
    tokio::fs::write(&path, data).await?;
    debug!("Saved upload ({} bytes) to {}", data.len(), path.display());
    Ok(path)
}
