//! End-to-end entry points: document in, rendered quiz out.
//!
//! Each call runs the same four steps: extract text (blocking pool), one
//! model call, validate, render. Nothing is retried and nothing is cached.

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::encode::Background;
use crate::pipeline::{extract, render};
use crate::quiz::{GenerationStats, QuizOutput};
use crate::synthesize::QuizSynthesizer;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Generate a quiz from the document at `input` using `config`.
///
/// # Errors
/// - [`QuizError::ProviderNotConfigured`] when no model backend can be built
/// - [`QuizError::Extraction`] when the document yields no text
/// - [`QuizError::Synthesis`] when the model call fails or its answer is not
///   a valid quiz
pub async fn generate(
    input: impl AsRef<Path>,
    config: &QuizConfig,
    background: &Background,
) -> Result<QuizOutput, QuizError> {
    let synthesizer = QuizSynthesizer::from_config(config)?;
    let input = input.as_ref();
    generate_with(
        &synthesizer,
        input,
        config.question_count,
        background,
        &quiz_title(input),
    )
    .await
}

/// Generate a quiz with an already-built synthesizer.
///
/// This is what the web server calls per request.
pub async fn generate_with(
    synthesizer: &QuizSynthesizer,
    input: &Path,
    question_count: usize,
    background: &Background,
    title: &str,
) -> Result<QuizOutput, QuizError> {
    let total_start = Instant::now();
    info!("Generating quiz from {}", input.display());

    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let text = extract::extract_blocking(input).await??;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    let text_chars = text.chars().count();
    debug!("Extracted {} chars in {}ms", text_chars, extract_duration_ms);

    // ── Step 2: Synthesize ───────────────────────────────────────────────
    let (quiz, model_elapsed) = synthesizer.synthesize_timed(&text, question_count).await;
    let quiz = quiz?;

    // ── Step 3: Render ───────────────────────────────────────────────────
    let html = render::render_quiz(&quiz, background, title);

    let stats = GenerationStats {
        text_chars,
        extract_duration_ms,
        model_duration_ms: model_elapsed.as_millis() as u64,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Quiz complete: {} questions, {}ms total",
        quiz.len(),
        stats.total_duration_ms
    );

    Ok(QuizOutput { quiz, html, stats })
}

/// Generate a quiz and write the page to `output_path`.
///
/// The write is atomic: readers see either the previous file or the complete
/// new one.
pub async fn generate_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &QuizConfig,
    background: &Background,
) -> Result<GenerationStats, QuizError> {
    let output = generate(input, config, background).await?;
    write_html_atomic(output_path.as_ref(), &output.html).await?;
    Ok(output.stats)
}

/// Generate a quiz from document bytes held in memory.
///
/// `filename` only supplies the extension (and the page title); the bytes go
/// to a managed temp file that is removed on return.
pub async fn generate_from_bytes(
    filename: &str,
    bytes: &[u8],
    config: &QuizConfig,
    background: &Background,
) -> Result<QuizOutput, QuizError> {
    let suffix = Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut tmp = tempfile::Builder::new()
        .prefix("quiz-input-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| QuizError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| QuizError::Internal(format!("tempfile write: {e}")))?;

    let synthesizer = QuizSynthesizer::from_config(config)?;
    // `tmp` is dropped (and the file deleted) when this returns
    generate_with(
        &synthesizer,
        tmp.path(),
        config.question_count,
        background,
        &quiz_title(Path::new(filename)),
    )
    .await
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input: impl AsRef<Path>,
    config: &QuizConfig,
    background: &Background,
) -> Result<QuizOutput, QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input, config, background))
}

/// Page title for a quiz generated from `input`.
pub fn quiz_title(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if stem.is_empty() {
        "Cuestionario".to_string()
    } else {
        format!("Cuestionario: {stem}")
    }
}

/// Write `html` to `path` through a temp file in the same directory.
pub async fn write_html_atomic(path: &Path, html: &str) -> Result<(), QuizError> {
    let path = path.to_path_buf();
    let html = html.to_owned();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &html))
        .await
        .map_err(|e| QuizError::Internal(format!("Write task panicked: {}", e)))?
}

fn write_atomic_blocking(path: &Path, html: &str) -> Result<(), QuizError> {
    let write_err = |source: std::io::Error| QuizError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(html.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", html.len(), path.display());
    Ok(())
}
