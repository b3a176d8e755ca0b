//! Configuration for quiz generation.
//!
//! All generation behaviour is controlled through [`QuizConfig`], built via
//! its [`QuizConfigBuilder`] or loaded with [`QuizConfig::from_env`].
//!
//! The Gemini API key is an explicit field handed to the model backend at
//! construction. `build()` rejects a Gemini config without one.

use crate::error::QuizError;
use crate::pipeline::llm::QuizModel;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used with the default provider.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Questions generated when the request does not say otherwise.
pub const DEFAULT_QUESTION_COUNT: usize = 2;

/// Upper bound on questions per quiz; keeps a single prompt answerable.
pub const MAX_QUESTION_COUNT: usize = 50;

/// Configuration for a quiz generation run.
#[derive(Clone)]
pub struct QuizConfig {
    /// Number of questions to ask for. Range: 1-50. Default: 2.
    pub question_count: usize,

    /// Provider name: "gemini" (default) or any name understood by
    /// `edgequake_llm::ProviderFactory` ("openai", "anthropic", "ollama", …).
    pub provider_name: String,

    /// Model identifier. If None, uses [`DEFAULT_MODEL`] for Gemini and
    /// the factory default otherwise.
    pub model: Option<String>,

    /// Google API key for the Gemini backend.
    pub api_key: Option<String>,

    /// Pre-constructed model backend. Takes precedence over `provider_name`.
    pub backend: Option<Arc<dyn QuizModel>>,

    /// Sampling temperature. None leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Maximum output tokens for the model answer. None = provider default.
    pub max_tokens: Option<usize>,

    /// Timeout for the single model call, in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Directory that receives uploads and rendered quizzes. Default: "uploads".
    pub upload_dir: PathBuf,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: None,
            api_key: None,
            backend: None,
            temperature: None,
            max_tokens: None,
            api_timeout_secs: 120,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("question_count", &self.question_count)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("backend", &self.backend.as_ref().map(|_| "<dyn QuizModel>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GOOGLE_API_KEY` (fallback `GEMINI_API_KEY`) | `api_key` |
    /// | `QUIZ_PROVIDER` | `provider_name` |
    /// | `QUIZ_MODEL` | `model` |
    /// | `QUIZ_QUESTION_COUNT` | `question_count` |
    /// | `QUIZ_UPLOAD_DIR` | `upload_dir` |
    ///
    /// Fails fast when the Gemini provider is selected and no key is set.
    pub fn from_env() -> Result<Self, QuizError> {
        Self::builder().apply_env().build()
    }

    /// The model id that will actually be requested.
    pub fn effective_model(&self) -> Option<&str> {
        match self.model.as_deref() {
            Some(m) => Some(m),
            None if self.is_gemini() => Some(DEFAULT_MODEL),
            None => None,
        }
    }

    pub fn is_gemini(&self) -> bool {
        self.provider_name.eq_ignore_ascii_case(DEFAULT_PROVIDER)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`QuizConfig`].
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl fmt::Debug for QuizConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config.fmt(f)
    }
}

impl QuizConfigBuilder {
    /// Fill fields from the environment (see [`QuizConfig::from_env`]).
    /// Values already set on the builder are overwritten only when the
    /// variable is present.
    pub fn apply_env(mut self) -> Self {
        if let Some(key) = env_non_empty("GOOGLE_API_KEY").or_else(|| env_non_empty("GEMINI_API_KEY")) {
            self.config.api_key = Some(key);
        }
        if let Some(p) = env_non_empty("QUIZ_PROVIDER") {
            self.config.provider_name = p;
        }
        if let Some(m) = env_non_empty("QUIZ_MODEL") {
            self.config.model = Some(m);
        }
        if let Some(n) = env_non_empty("QUIZ_QUESTION_COUNT").and_then(|v| v.parse().ok()) {
            self.config.question_count = n;
        }
        if let Some(dir) = env_non_empty("QUIZ_UPLOAD_DIR") {
            self.config.upload_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn question_count(mut self, n: usize) -> Self {
        self.config.question_count = n;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn QuizModel>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.question_count == 0 || c.question_count > MAX_QUESTION_COUNT {
            return Err(QuizError::InvalidConfig(format!(
                "Question count must be 1-{MAX_QUESTION_COUNT}, got {}",
                c.question_count
            )));
        }
        if c.provider_name.trim().is_empty() {
            return Err(QuizError::InvalidConfig("Provider name must not be empty".into()));
        }
        if c.backend.is_none() && c.is_gemini() && c.api_key.is_none() {
            return Err(QuizError::ProviderNotConfigured {
                provider: DEFAULT_PROVIDER.to_string(),
                hint: "Set GOOGLE_API_KEY (or GEMINI_API_KEY) in the environment or .env file.".into(),
            });
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = QuizConfig::default();
        assert_eq!(c.question_count, 2);
        assert_eq!(c.provider_name, "gemini");
        assert_eq!(c.effective_model(), Some("gemini-1.5-flash"));
        assert_eq!(c.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn gemini_without_key_fails_fast() {
        let err = QuizConfig::builder().build().unwrap_err();
        assert!(matches!(err, QuizError::ProviderNotConfigured { .. }), "got: {err}");
    }

    #[test]
    fn gemini_with_key_builds() {
        let c = QuizConfig::builder().api_key("k").build().unwrap();
        assert_eq!(c.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn other_provider_does_not_need_google_key() {
        let c = QuizConfig::builder()
            .provider_name("openai")
            .model("gpt-4.1-nano")
            .build()
            .unwrap();
        assert!(!c.is_gemini());
        assert_eq!(c.effective_model(), Some("gpt-4.1-nano"));
    }

    #[test]
    fn question_count_bounds() {
        assert!(QuizConfig::builder().api_key("k").question_count(0).build().is_err());
        assert!(QuizConfig::builder().api_key("k").question_count(51).build().is_err());
        assert!(QuizConfig::builder().api_key("k").question_count(50).build().is_ok());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = QuizConfig::builder().api_key("k").temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, Some(2.0));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = QuizConfig::builder().api_key("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
