//! CLI binary for edgequake-quiz.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`
//! and either serves the upload form or runs one generation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_quiz::pipeline::input::quiz_output_name;
use edgequake_quiz::server::{self, AppState, ServerConfig, DEFAULT_BODY_LIMIT};
use edgequake_quiz::{
    embedded_quiz, encode_background_file, extract, generate, Background, QuizConfig,
};
use edgequake_quiz::config::MAX_QUESTION_COUNT;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Web upload form on http://127.0.0.1:5001
  doc2quiz serve

  # One quiz from a PDF, 5 questions, with a background image
  doc2quiz generate tema1.pdf -n 5 --background fondo.jpg -o test_tema1.html

  # Use another provider through edgequake-llm
  doc2quiz --provider openai --model gpt-4.1-mini generate slides.pptx

  # Show the text a document yields (no API key needed)
  doc2quiz extract slides.pptx

  # Print the quiz embedded in a generated page
  doc2quiz inspect test_tema1.html

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY        Gemini API key (fallback: GEMINI_API_KEY)
  QUIZ_PROVIDER         Provider: gemini (default), openai, anthropic, ollama, ...
  QUIZ_MODEL            Model ID (default for gemini: gemini-1.5-flash)
  QUIZ_QUESTION_COUNT   Default number of questions (1-50, default 2)
  QUIZ_UPLOAD_DIR       Upload and output directory for `serve` (default uploads)
  RUST_LOG              Log filter override

  A .env file in the working directory is loaded first.
"#;

/// Turn PDF and PowerPoint documents into multiple-choice quizzes.
#[derive(Parser, Debug)]
#[command(
    name = "doc2quiz",
    version,
    about = "Turn PDF and PowerPoint documents into multiple-choice quizzes using LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// LLM provider: gemini (default), openai, anthropic, ollama, ...
    #[arg(long, global = true, env = "QUIZ_PROVIDER")]
    provider: Option<String>,

    /// Model ID (e.g. gemini-1.5-flash, gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, global = true, env = "QUIZ_MODEL")]
    model: Option<String>,

    /// Gemini API key.
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Sampling temperature (0.0-2.0).
    #[arg(long, global = true, env = "QUIZ_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens for the model answer.
    #[arg(long, global = true, env = "QUIZ_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Model call timeout in seconds.
    #[arg(long, global = true, env = "QUIZ_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "QUIZ_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form and the /upload endpoint.
    Serve {
        /// Listen address.
        #[arg(long, env = "QUIZ_BIND", default_value = "127.0.0.1:5001")]
        bind: SocketAddr,

        /// Directory for uploads and rendered quizzes.
        #[arg(long, env = "QUIZ_UPLOAD_DIR")]
        upload_dir: Option<PathBuf>,

        /// Maximum request body size in MiB.
        #[arg(long, env = "QUIZ_BODY_LIMIT_MB", default_value_t = DEFAULT_BODY_LIMIT / (1024 * 1024))]
        body_limit_mb: usize,
    },

    /// Generate one quiz and write it as HTML.
    Generate {
        /// PDF or PPTX document.
        input: PathBuf,

        /// Number of questions (1-50).
        #[arg(short = 'n', long, env = "QUIZ_QUESTION_COUNT",
              value_parser = clap::value_parser!(u32).range(1..=MAX_QUESTION_COUNT as i64))]
        questions: Option<u32>,

        /// Background image embedded in the page.
        #[arg(long)]
        background: Option<PathBuf>,

        /// Output file. Default: test_<stem>.html in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the quiz and stats as JSON on stdout as well.
        #[arg(long)]
        json: bool,
    },

    /// Print the text extracted from a document.
    Extract {
        /// PDF or PPTX document.
        input: PathBuf,
    },

    /// Print the quiz JSON embedded in a generated page.
    Inspect {
        /// A page written by `generate` or the server.
        html: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if matches!(cli.command, Command::Serve { .. }) {
        "info"
    } else {
        // The spinner covers progress for one-shot commands.
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Serve {
            bind,
            upload_dir,
            body_limit_mb,
        } => {
            let mut config = build_config(&cli, None)?;
            if let Some(dir) = upload_dir {
                config.upload_dir = dir.clone();
            }
            let state = Arc::new(AppState::new(config).context("Failed to configure model")?);
            let server_config = ServerConfig {
                bind: *bind,
                body_limit: body_limit_mb.saturating_mul(1024 * 1024),
            };
            if !cli.quiet {
                eprintln!("{} Listening on {}", green("◆"), bold(&format!("http://{bind}")));
            }
            server::serve(state, &server_config)
                .await
                .context("Server failed")?;
        }

        Command::Generate {
            input,
            questions,
            background,
            output,
            json,
        } => {
            let config = build_config(&cli, questions.map(|n| n as usize))?;
            let background = match background {
                Some(path) => {
                    let bg = encode_background_file(path);
                    if bg == Background::None && !cli.quiet {
                        eprintln!("{} Ignoring background {}", dim("·"), path.display());
                    }
                    bg
                }
                None => Background::None,
            };
            let output_path = output.clone().unwrap_or_else(|| default_output(input));

            let progress = (!cli.quiet).then(|| {
                spinner(&format!(
                    "Generating {} questions from {}…",
                    config.question_count,
                    input.display()
                ))
            });
            let result = generate(input, &config, &background).await;
            if let Some(ref s) = progress {
                s.finish_and_clear();
            }
            let result = result.context("Quiz generation failed")?;

            edgequake_quiz::generate::write_html_atomic(&output_path, &result.html)
                .await
                .context("Failed to write quiz")?;

            if *json {
                let value = serde_json::json!({ "quiz": result.quiz, "stats": result.stats });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("Failed to serialise output")?
                );
            }
            if !cli.quiet {
                eprintln!(
                    "{}  {} questions  {}ms  →  {}",
                    green("✔"),
                    result.quiz.len(),
                    result.stats.total_duration_ms,
                    bold(&output_path.display().to_string()),
                );
                eprintln!(
                    "   {}",
                    dim(&format!(
                        "{} chars of text, extract {}ms, model {}ms",
                        result.stats.text_chars,
                        result.stats.extract_duration_ms,
                        result.stats.model_duration_ms
                    ))
                );
            }
        }

        Command::Extract { input } => {
            let path = input.clone();
            let text = tokio::task::spawn_blocking(move || extract(&path))
                .await
                .context("Extraction task panicked")?
                .map_err(|e| anyhow::anyhow!(e.diagnostic()))?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        Command::Inspect { html } => {
            let page = tokio::fs::read_to_string(html)
                .await
                .with_context(|| format!("Failed to read {}", html.display()))?;
            let quiz = embedded_quiz(&page)
                .with_context(|| format!("No embedded quiz found in {}", html.display()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&quiz).context("Failed to serialise quiz")?
            );
        }
    }

    Ok(())
}

/// Map CLI args onto the environment-derived config.
fn build_config(cli: &Cli, question_count: Option<usize>) -> Result<QuizConfig> {
    let mut builder = QuizConfig::builder()
        .apply_env()
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref p) = cli.provider {
        builder = builder.provider_name(p);
    }
    if let Some(ref m) = cli.model {
        builder = builder.model(m);
    }
    if let Some(ref k) = cli.api_key {
        builder = builder.api_key(k);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(n) = question_count {
        builder = builder.question_count(n);
    }

    builder.build().context("Invalid configuration")
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    PathBuf::from(quiz_output_name(&name))
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
