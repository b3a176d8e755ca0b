//! Quiz data model and schema validation.
//!
//! Field names follow the JSON contract the model is taught in
//! [`crate::prompts`] (`preguntas`, `pregunta`, `opciones`, …). The Rust side
//! uses English names and `serde(rename)` to map between the two.

use serde::{Deserialize, Serialize};

/// Number of options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// An ordered list of multiple-choice questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "preguntas")]
    pub questions: Vec<Question>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "pregunta")]
    pub prompt: String,
    #[serde(rename = "opciones")]
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    #[serde(rename = "respuesta_correcta_index")]
    pub correct_index: usize,
    #[serde(rename = "justificacion")]
    pub justification: String,
}

/// A schema violation found by [`Quiz::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    WrongQuestionCount { expected: usize, actual: usize },
    WrongOptionCount { question: usize, actual: usize },
    IndexOutOfBounds { question: usize, index: usize, options: usize },
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaViolation::WrongQuestionCount { expected, actual } => {
                write!(f, "expected {expected} questions, got {actual}")
            }
            SchemaViolation::WrongOptionCount { question, actual } => write!(
                f,
                "question {} has {actual} options, expected {OPTIONS_PER_QUESTION}",
                question + 1
            ),
            SchemaViolation::IndexOutOfBounds {
                question,
                index,
                options,
            } => write!(
                f,
                "question {} marks option {index} as correct but has only {options} options",
                question + 1
            ),
        }
    }
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Check the structural invariants the renderer relies on.
    ///
    /// Returns the first violation found, scanning questions in order.
    pub fn validate(&self, expected_questions: usize) -> Result<(), SchemaViolation> {
        if self.questions.len() != expected_questions {
            return Err(SchemaViolation::WrongQuestionCount {
                expected: expected_questions,
                actual: self.questions.len(),
            });
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(SchemaViolation::WrongOptionCount {
                    question: i,
                    actual: q.options.len(),
                });
            }
            if q.correct_index >= q.options.len() {
                return Err(SchemaViolation::IndexOutOfBounds {
                    question: i,
                    index: q.correct_index,
                    options: q.options.len(),
                });
            }
        }
        Ok(())
    }
}

impl Question {
    /// The text of the correct option.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// Timing and size figures for a single generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    /// Characters of extracted document text sent as context.
    pub text_chars: usize,
    pub extract_duration_ms: u64,
    pub model_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything produced by [`crate::generate::generate`].
#[derive(Debug, Clone)]
pub struct QuizOutput {
    pub quiz: Quiz,
    /// The standalone HTML page.
    pub html: String,
    pub stats: GenerationStats,
}
