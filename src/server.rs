//! HTTP front end: upload form plus a single `POST /upload` that answers with
//! the rendered quiz as a download.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | upload form |
//! | `POST /upload` | `200` attachment `test_<stem>.html` |
//! | | `400` extraction error page |
//! | | `500` synthesis error page (pretty JSON with the raw model answer) |
//! | | `303` back to `/` when no file was sent |

use crate::config::{QuizConfig, DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT};
use crate::error::QuizError;
use crate::generate::{generate_with, quiz_title, write_html_atomic};
use crate::pipeline::encode::{encode_background, Background};
use crate::pipeline::input::{quiz_output_name, quiz_output_path, save_upload};
use crate::pipeline::render::escape_html;
use crate::synthesize::QuizSynthesizer;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Default listen address.
pub const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 5001);

/// Default request body limit (document plus background image).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024 * 1024;

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(DEFAULT_BIND),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Shared per-process state: the config and the model backend built from it.
pub struct AppState {
    pub config: QuizConfig,
    pub synthesizer: QuizSynthesizer,
}

impl AppState {
    /// Resolve the model backend once, at startup.
    pub fn new(config: QuizConfig) -> Result<Self, QuizError> {
        let synthesizer = QuizSynthesizer::from_config(&config)?;
        Ok(Self {
            config,
            synthesizer,
        })
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Create the upload directory and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, server: &ServerConfig) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    let app = router(Arc::clone(&state), server.body_limit);

    let listener = tokio::net::TcpListener::bind(server.bind).await?;
    info!(
        "Listening on http://{} (model {}, uploads in {})",
        server.bind,
        state.synthesizer.model_name(),
        state.config.upload_dir.display()
    );
    axum::serve(listener, app).await
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn index() -> Html<String> {
    Html(
        INDEX_HTML
            .replace("{{ max_questions }}", &MAX_QUESTION_COUNT.to_string())
            .replace("{{ default_questions }}", &DEFAULT_QUESTION_COUNT.to_string()),
    )
}

async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match parse_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return (StatusCode::BAD_REQUEST, Html(format!("<p>{}</p>", escape_html(&e))))
                .into_response();
        }
    };

    let Some(file) = form.file else {
        return Redirect::to("/").into_response();
    };

    let question_count = resolve_question_count(form.num_preguntas.as_deref(), state.config.question_count);
    let upload_dir = &state.config.upload_dir;

    let saved = match save_upload(upload_dir, &file.filename, &file.data).await {
        Ok(path) => path,
        Err(e) => {
            error!("Could not save upload '{}': {}", file.filename, e);
            return internal_error(&format!("No se pudo guardar el archivo: {e}"));
        }
    };
    let saved_name = saved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    info!(
        "Upload '{}' saved as {} ({} questions requested)",
        file.filename, saved_name, question_count
    );

    let output = generate_with(
        &state.synthesizer,
        &saved,
        question_count,
        &form.background,
        &quiz_title(&saved),
    )
    .await;

    match output {
        Ok(output) => {
            let output_name = quiz_output_name(&saved_name);
            let output_path = quiz_output_path(upload_dir, &saved_name);
            if let Err(e) = write_html_atomic(&output_path, &output.html).await {
                error!("{}", e);
                return internal_error(&e.to_string());
            }
            info!("Serving {} ({} bytes)", output_name, output.html.len());
            attachment(&output_name, output.html)
        }
        Err(QuizError::Extraction(e)) => {
            warn!("Extraction failed for {}: {}", saved_name, e);
            (
                StatusCode::BAD_REQUEST,
                Html(format!(
                    "<h1>Error en la extracción de texto</h1><p>{}</p>",
                    escape_html(&e.diagnostic())
                )),
            )
                .into_response()
        }
        Err(QuizError::Synthesis(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Error al generar el Quiz</h1><pre>{}</pre>",
                escape_html(&e.to_pretty_json())
            )),
        )
            .into_response(),
        Err(e) => {
            error!("Quiz generation failed: {}", e);
            internal_error(&e.to_string())
        }
    }
}

fn attachment(filename: &str, html: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        html,
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<h1>Error interno</h1><p>{}</p>", escape_html(message))),
    )
        .into_response()
}

/// Parse the `num_preguntas` field. Missing, non-numeric or out-of-range
/// values fall back to `default`.
fn resolve_question_count(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<usize>() {
        Ok(n) if (1..=MAX_QUESTION_COUNT).contains(&n) => n,
        _ => {
            warn!(
                "Ignoring num_preguntas={:?}; using {} (allowed 1-{})",
                raw, default, MAX_QUESTION_COUNT
            );
            default
        }
    }
}

// ── Multipart ────────────────────────────────────────────────────────────────

/// An uploaded document.
struct UploadedFile {
    filename: String,
    data: Vec<u8>,
}

/// Parsed form fields from the upload form.
struct UploadForm {
    /// `None` when the field is absent, has no filename, or is empty.
    file: Option<UploadedFile>,
    num_preguntas: Option<String>,
    background: Background,
}

async fn parse_multipart(mut multipart: Multipart) -> Result<UploadForm, String> {
    let mut file: Option<UploadedFile> = None;
    let mut num_preguntas: Option<String> = None;
    let mut background = Background::None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();
                if !filename.trim().is_empty() && !data.is_empty() {
                    file = Some(UploadedFile { filename, data });
                }
            }
            "num_preguntas" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| format!("Failed to read num_preguntas: {}", e))?;
                num_preguntas = Some(val);
            }
            "background" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read background: {}", e))?;
                background = encode_background(&filename, &data);
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    Ok(UploadForm {
        file,
        num_preguntas,
        background,
    })
}
