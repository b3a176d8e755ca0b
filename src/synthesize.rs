//! Quiz synthesis: document text → one model call → validated [`Quiz`].

use crate::config::QuizConfig;
use crate::error::{QuizError, SynthesisError};
use crate::pipeline::llm::{call_model, resolve_model, QuizModel};
use crate::pipeline::postprocess::parse_quiz;
use crate::prompts::build_quiz_prompt;
use crate::quiz::Quiz;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Asks a [`QuizModel`] for a quiz and validates the answer.
#[derive(Clone)]
pub struct QuizSynthesizer {
    model: Arc<dyn QuizModel>,
}

impl QuizSynthesizer {
    pub fn new(model: Arc<dyn QuizModel>) -> Self {
        Self { model }
    }

    /// Resolve the model backend from `config`.
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        Ok(Self::new(resolve_model(config)?))
    }

    pub fn model_name(&self) -> String {
        self.model.name()
    }

    /// Generate a quiz of exactly `question_count` questions from `text`.
    pub async fn synthesize(&self, text: &str, question_count: usize) -> Result<Quiz, SynthesisError> {
        self.synthesize_timed(text, question_count).await.0
    }

    /// Like [`synthesize`](Self::synthesize), also returning how long the
    /// model call took.
    pub(crate) async fn synthesize_timed(
        &self,
        text: &str,
        question_count: usize,
    ) -> (Result<Quiz, SynthesisError>, Duration) {
        let prompt = build_quiz_prompt(text, question_count);
        info!(
            "Requesting {} questions from {} ({} chars of context)",
            question_count,
            self.model.name(),
            text.chars().count()
        );

        let (answer, elapsed) = call_model(self.model.as_ref(), &prompt).await;
        let raw = match answer {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Model call failed after {:?}: {}", elapsed, e);
                return (Err(SynthesisError::model_call(e.to_string())), elapsed);
            }
        };
        debug!("Model answered in {:?} with {} chars", elapsed, raw.len());

        let result = parse_quiz(&raw, question_count);
        match &result {
            Ok(quiz) => info!("Quiz ready: {} questions", quiz.len()),
            Err(e) => warn!("Unusable model answer ({:?}): {}", e.kind, e.message),
        }
        (result, elapsed)
    }
}
