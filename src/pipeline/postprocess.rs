//! Post-processing: turn a raw model answer into a validated [`Quiz`].
//!
//! Models are told not to wrap their JSON in Markdown fences, and routinely do
//! anyway. Cleanup trims, deletes every literal ` ```json ` and ` ``` `, then
//! trims again. Anything still not parseable is
//! reported with the untouched raw answer so it can be shown to the user.
//!
//! Parsing happens in three steps, each with its own error kind:
//!
//! 1. text → `serde_json::Value` ([`SynthesisErrorKind::InvalidJson`])
//! 2. `Value` → [`Quiz`] (missing or mistyped keys,
//!    [`SynthesisErrorKind::MalformedQuiz`])
//! 3. [`Quiz::validate`] (question/option counts, index bounds,
//!    [`SynthesisErrorKind::MalformedQuiz`])
//!
//! [`SynthesisErrorKind::InvalidJson`]: crate::error::SynthesisErrorKind::InvalidJson
//! [`SynthesisErrorKind::MalformedQuiz`]: crate::error::SynthesisErrorKind::MalformedQuiz

use crate::error::SynthesisError;
use crate::quiz::Quiz;
use serde_json::Value;
use tracing::debug;

/// Parse and validate a raw model answer expected to hold `expected_questions`
/// questions.
pub fn parse_quiz(raw: &str, expected_questions: usize) -> Result<Quiz, SynthesisError> {
    let cleaned = strip_fences(raw);
    debug!("Model answer: {} chars raw, {} after cleanup", raw.len(), cleaned.len());

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| SynthesisError::invalid_json(e.to_string(), raw))?;

    let quiz: Quiz = serde_json::from_value(value)
        .map_err(|e| SynthesisError::malformed(e.to_string(), raw))?;

    quiz.validate(expected_questions)
        .map_err(|v| SynthesisError::malformed(v.to_string(), raw))?;

    Ok(quiz)
}

// ── Cleanup ──────────────────────────────────────────────────────────────────

/// Remove fence markers and surrounding whitespace.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = trim_invisible(raw);
    let without = trimmed.replace("```json", "").replace("```", "");
    trim_invisible(&without).to_string()
}

/// Trim whitespace plus a leading BOM or zero-width characters some
/// providers emit at the edges.
fn trim_invisible(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}'))
}
