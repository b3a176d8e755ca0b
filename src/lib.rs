//! # edgequake-quiz
//!
//! Turn PDF documents and PowerPoint decks into multiple-choice quizzes with a
//! single LLM call, rendered as a standalone HTML page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / PPTX
//!  │
//!  ├─ 1. Extract   plain text via lopdf / zip + quick-xml (spawn_blocking)
//!  ├─ 2. Prompt    Spanish instructions + JSON example + document text
//!  ├─ 3. Model     one call to Gemini (default) or any edgequake-llm provider
//!  ├─ 4. Validate  strip fences, parse JSON, check the quiz schema
//!  └─ 5. Render    self-contained HTML, optional inline background image
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_quiz::{generate, Background, QuizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GOOGLE_API_KEY (or GEMINI_API_KEY)
//!     let config = QuizConfig::from_env()?;
//!     let output = generate("tema1.pdf", &config, &Background::None).await?;
//!     for q in &output.quiz.questions {
//!         println!("{} -> {:?}", q.prompt, q.correct_option());
//!     }
//!     std::fs::write("test_tema1.html", output.html)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on (via `cli`) | axum upload server ([`server`]) |
//! | `cli`    | on      | Enables the `doc2quiz` binary (clap + anyhow + tracing-subscriber) |
//!
//! Library-only use:
//! ```toml
//! edgequake-quiz = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod quiz;
#[cfg(feature = "server")]
pub mod server;
pub mod synthesize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{QuizConfig, QuizConfigBuilder};
pub use error::{ExtractionError, ModelError, QuizError, SynthesisError, SynthesisErrorKind};
pub use generate::{generate, generate_from_bytes, generate_sync, generate_to_file, generate_with};
pub use pipeline::encode::{encode_background, encode_background_file, Background};
pub use pipeline::extract::{extract, Document, DocumentKind, ExtractionResult};
pub use pipeline::llm::{ProviderModel, QuizModel};
pub use pipeline::render::{embedded_quiz, render_quiz};
pub use quiz::{GenerationStats, Question, Quiz, QuizOutput};
pub use synthesize::QuizSynthesizer;
