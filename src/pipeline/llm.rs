//! Model backends: send one prompt, get one text answer.
//!
//! [`QuizModel`] is the seam between quiz synthesis and whatever model
//! actually answers. The shipped backend is [`ProviderModel`], which wraps an
//! `edgequake_llm` provider: `GeminiProvider` built with the configured key
//! by default, or anything `ProviderFactory` knows (OpenAI, Anthropic,
//! Ollama, …).
//!
//! Every call is a single best-effort round-trip: no streaming, no
//! conversation state and no retry. A timeout bounds the wait.

use crate::config::{QuizConfig, DEFAULT_MODEL};
use crate::error::{ModelError, QuizError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, GeminiProvider, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A text-generation model that answers a single prompt.
#[async_trait]
pub trait QuizModel: Send + Sync {
    /// Short label for logs, e.g. `gemini/gemini-1.5-flash`.
    fn name(&self) -> String;

    /// Send `prompt` and return the model's raw text answer.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

// ── edgequake-llm providers ──────────────────────────────────────────────────

/// Any `edgequake_llm` provider, asked with a single user message.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, config: &QuizConfig) -> Self {
        Self {
            provider,
            label: label.into(),
            options: build_options(config),
            timeout_secs: config.api_timeout_secs,
        }
    }
}

/// Build `CompletionOptions` from the quiz config.
fn build_options(config: &QuizConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

#[async_trait]
impl QuizModel for ProviderModel {
    fn name(&self) -> String {
        self.label.clone()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let messages = vec![ChatMessage::user(prompt)];
        let call = self.provider.chat(&messages, Some(&self.options));
        let response = tokio::time::timeout(Duration::from_secs(self.timeout_secs), call)
            .await
            .map_err(|_| ModelError::Timeout {
                secs: self.timeout_secs,
            })?
            .map_err(|e| ModelError::Provider(e.to_string()))?;
        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        if response.content.trim().is_empty() {
            return Err(ModelError::EmptyResponse(
                response
                    .finish_reason
                    .unwrap_or_else(|| "empty answer".to_string()),
            ));
        }
        Ok(response.content)
    }
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Resolve the model backend, from most-specific to least-specific:
///
/// 1. **Pre-built backend** (`config.backend`): used as-is.
/// 2. **Gemini** (the default provider): `GeminiProvider` with the key from
///    `config.api_key`, never the process environment.
/// 3. **Any other provider name**: `ProviderFactory::create_llm_provider`,
///    which reads that provider's own API key variable.
pub fn resolve_model(config: &QuizConfig) -> Result<Arc<dyn QuizModel>, QuizError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if config.is_gemini() {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| QuizError::ProviderNotConfigured {
                provider: config.provider_name.clone(),
                hint: "Set GOOGLE_API_KEY (or GEMINI_API_KEY).".into(),
            })?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let provider: Arc<dyn LLMProvider> =
            Arc::new(GeminiProvider::new(api_key).with_model(model));
        let label = format!("gemini/{model}");
        info!("Using model {}", label);
        return Ok(Arc::new(ProviderModel::new(provider, label, config)));
    }

    let name = config.provider_name.as_str();
    let model = config.model.as_deref().unwrap_or_default();
    let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        QuizError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    let label = if model.is_empty() {
        name.to_string()
    } else {
        format!("{name}/{model}")
    };
    info!("Using model {}", label);
    Ok(Arc::new(ProviderModel::new(provider, label, config)))
}

/// Call `model` once, timing the call.
pub(crate) async fn call_model(
    model: &dyn QuizModel,
    prompt: &str,
) -> (Result<String, ModelError>, Duration) {
    let start = Instant::now();
    let result = model.generate(prompt).await;
    (result, start.elapsed())
}
