//! Error types for the edgequake-quiz library.
//!
//! Three error types map onto the three ways a quiz request can fail:
//!
//! * [`ExtractionError`]: the uploaded document could not be turned into
//!   text (unsupported extension, corrupt or encrypted PDF, broken deck).
//!   The web layer answers these with HTTP 400.
//!
//! * [`SynthesisError`]: the model call failed or its answer could not be
//!   turned into a valid [`crate::quiz::Quiz`]. Always carries the raw model
//!   output for diagnostics. The web layer answers these with HTTP 500.
//!
//! * [`QuizError`]: everything fatal for a whole request, including the two
//!   above plus configuration, provider and output I/O failures.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Marker stored in [`SynthesisError::raw_response`] when the model never
/// produced any output.
pub const NO_RESPONSE: &str = "No response";

/// Fixed diagnostic for PDFs that cannot be decoded.
pub const UNREADABLE_PDF_MESSAGE: &str =
    "No se pudo leer el archivo PDF. Puede que esté corrupto o encriptado.";

/// All fatal errors returned by the top-level `generate*` functions.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// The configured provider could not be constructed (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write the rendered quiz.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a document produced no text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The extension is neither `pdf` nor `pptx`.
    #[error("Formato de archivo no soportado: '{extension}'. Sube un archivo PDF o PPTX.")]
    UnsupportedFormat { extension: String },

    /// The file could not be opened at all.
    #[error("No se pudo abrir el archivo '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corrupt or encrypted PDF. `detail` is for logs only; the display is fixed.
    #[error("{}", UNREADABLE_PDF_MESSAGE)]
    UnreadablePdf { path: PathBuf, detail: String },

    /// Anything that went wrong while walking a slide deck.
    #[error("No se pudo leer el archivo PPTX. {detail}")]
    UnreadablePptx { path: PathBuf, detail: String },
}

impl ExtractionError {
    /// User-facing message in the `Error: <detail>` shape shown on the error page.
    pub fn diagnostic(&self) -> String {
        format!("Error: {self}")
    }
}

/// Which stage of synthesis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisErrorKind {
    /// Transport, authentication or provider error; no usable output.
    ModelCall,
    /// The model answered, but not with JSON.
    InvalidJson,
    /// Valid JSON that does not match the quiz schema.
    MalformedQuiz,
}

/// A failed quiz synthesis.
///
/// Serialises as `{"error": <Display text>, "raw_response": ...}` so the web
/// layer can pretty-print it verbatim on the error page.
#[derive(Debug, Clone, Error)]
#[error("Error al generar o parsear el cuestionario: {message}")]
pub struct SynthesisError {
    pub kind: SynthesisErrorKind,
    pub message: String,
    pub raw_response: String,
}

impl Serialize for SynthesisError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SynthesisError", 2)?;
        state.serialize_field("error", &self.to_string())?;
        state.serialize_field("raw_response", &self.raw_response)?;
        state.end()
    }
}

impl SynthesisError {
    /// The model call itself failed, so there is no raw output to keep.
    pub fn model_call(message: impl Into<String>) -> Self {
        Self {
            kind: SynthesisErrorKind::ModelCall,
            message: message.into(),
            raw_response: NO_RESPONSE.to_string(),
        }
    }

    pub fn invalid_json(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind: SynthesisErrorKind::InvalidJson,
            message: message.into(),
            raw_response: raw.into(),
        }
    }

    pub fn malformed(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind: SynthesisErrorKind::MalformedQuiz,
            message: message.into(),
            raw_response: raw.into(),
        }
    }

    /// Pretty JSON used on the HTTP 500 page.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }
}

/// Error surfaced by a [`crate::pipeline::llm::QuizModel`] backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The call exceeded the configured timeout.
    #[error("model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The API answered successfully but carried no text (e.g. safety block).
    #[error("model returned no text: {0}")]
    EmptyResponse(String),

    /// Error reported by an edgequake-llm provider.
    #[error("provider error: {0}")]
    Provider(String),
}
