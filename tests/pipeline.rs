//! Integration tests for the extraction → synthesis → render pipeline.
//!
//! Documents are generated in code and the model is a scripted stub, so these
//! run offline. The live Gemini test at the bottom is gated behind
//! `E2E_ENABLED`.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

mod common;

use common::{write_encrypted_pdf, write_pdf, write_pptx, EchoExampleModel, FailingModel, FixedModel};
use edgequake_quiz::{
    embedded_quiz, encode_background, extract, generate, generate_from_bytes, generate_to_file,
    generate_with, Background, ExtractionError, QuizConfig, QuizError, QuizSynthesizer,
    SynthesisErrorKind,
};
use std::sync::Arc;

fn echo_synth() -> QuizSynthesizer {
    QuizSynthesizer::new(Arc::new(EchoExampleModel { fenced: false }))
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[test]
fn test_pdf_text_is_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "hello.pdf", "Hello from page one");
    let text = extract(&path).unwrap();
    assert!(text.contains("Hello"), "got: {text:?}");
}

#[test]
fn test_corrupt_pdf_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.7\n1 0 obj << /Type /Catalog").unwrap();
    let err = extract(&path).unwrap_err();
    assert!(matches!(err, ExtractionError::UnreadablePdf { .. }), "got: {err:?}");
    assert_eq!(
        err.diagnostic(),
        "Error: No se pudo leer el archivo PDF. Puede que esté corrupto o encriptado."
    );
}

#[test]
fn test_encrypted_pdf_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_encrypted_pdf(dir.path(), "locked.pdf", "Secret page");
    let err = extract(&path).unwrap_err();
    match &err {
        ExtractionError::UnreadablePdf { detail, .. } => assert!(detail.contains("encrypted")),
        other => panic!("expected UnreadablePdf, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "No se pudo leer el archivo PDF. Puede que esté corrupto o encriptado."
    );
}

#[test]
fn test_pptx_follows_presentation_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(
        dir.path(),
        "deck.pptx",
        &[&["Primera", ""], &["Título uno", "Línea A\nLínea B"]],
    );
    let text = extract(&path).unwrap();
    assert_eq!(text, "Primera\n\nTítulo uno\nLínea A\nLínea B\n");
}

#[test]
fn test_uppercase_extension_dispatches() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(dir.path(), "DECK.PPTX", &[&["Hola"]]);
    assert_eq!(extract(&path).unwrap(), "Hola\n");
}

// ── Synthesis ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_echo_model_gives_exact_count() {
    let quiz = echo_synth().synthesize("La célula es...", 3).await.unwrap();
    assert_eq!(quiz.len(), 3);
    for q in &quiz.questions {
        assert_eq!(q.options.len(), 4);
        assert!(q.correct_index <= 3);
    }
}

#[tokio::test]
async fn test_fenced_answer_parses() {
    let synth = QuizSynthesizer::new(Arc::new(EchoExampleModel { fenced: true }));
    let quiz = synth.synthesize("texto", 2).await.unwrap();
    assert_eq!(quiz.len(), 2);
}

#[tokio::test]
async fn test_non_json_answer_keeps_raw() {
    let raw = "Lo siento, no puedo generar el cuestionario.";
    let synth = QuizSynthesizer::new(Arc::new(FixedModel(raw.into())));
    let err = synth.synthesize("texto", 2).await.unwrap_err();
    assert_eq!(err.kind, SynthesisErrorKind::InvalidJson);
    assert_eq!(err.raw_response, raw);

    let pretty: serde_json::Value = serde_json::from_str(&err.to_pretty_json()).unwrap();
    assert_eq!(pretty["raw_response"], raw);
    let lead = pretty["error"].as_str().unwrap();
    assert!(lead.starts_with("Error al generar o parsear el cuestionario: "), "got: {lead}");
}

#[tokio::test]
async fn test_wrong_count_is_malformed() {
    let two = serde_json::to_string(&edgequake_quiz::prompts::example_structure(2)).unwrap();
    let synth = QuizSynthesizer::new(Arc::new(FixedModel(two)));
    let err = synth.synthesize("texto", 5).await.unwrap_err();
    assert_eq!(err.kind, SynthesisErrorKind::MalformedQuiz);
}

// ── End to end with a stub model ─────────────────────────────────────────────

#[tokio::test]
async fn test_generate_with_pptx_renders_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(dir.path(), "bio.pptx", &[&["Fotosíntesis", "Luz y agua"]]);

    let output = generate_with(&echo_synth(), &path, 4, &Background::None, "Biología")
        .await
        .unwrap();

    assert_eq!(output.quiz.len(), 4);
    assert_eq!(output.stats.text_chars, "Fotosíntesis\nLuz y agua\n".chars().count());
    assert_eq!(embedded_quiz(&output.html), Some(output.quiz.clone()));
    assert!(output.html.contains("<title>Biología</title>"));
}

#[tokio::test]
async fn test_generate_with_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(dir.path(), "bio.pptx", &[&["Fotosíntesis"]]);
    let bg = encode_background("fondo.png", &common::png_bytes());

    let output = generate_with(&echo_synth(), &path, 1, &bg, "t").await.unwrap();
    assert!(output.html.contains("url('data:image/png;base64,"));
}

#[tokio::test]
async fn test_generate_unsupported_is_extraction_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.docx");
    std::fs::write(&path, b"PK").unwrap();

    let err = generate_with(&echo_synth(), &path, 2, &Background::None, "t")
        .await
        .unwrap_err();
    assert!(
        matches!(err, QuizError::Extraction(ExtractionError::UnsupportedFormat { .. })),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_generate_model_failure_is_synthesis_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(dir.path(), "deck.pptx", &[&["Hola"]]);
    let config = QuizConfig::builder()
        .backend(Arc::new(FailingModel))
        .build()
        .unwrap();

    match generate(&path, &config, &Background::None).await {
        Err(QuizError::Synthesis(e)) => {
            assert_eq!(e.kind, SynthesisErrorKind::ModelCall);
            assert_eq!(e.raw_response, "No response");
        }
        other => panic!("expected synthesis error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_to_file_writes_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(dir.path(), "deck.pptx", &[&["Hola"]]);
    let out = dir.path().join("out/test_deck.html");
    let config = QuizConfig::builder()
        .backend(Arc::new(EchoExampleModel { fenced: true }))
        .question_count(3)
        .build()
        .unwrap();

    let stats = generate_to_file(&path, &out, &config, &Background::None)
        .await
        .unwrap();
    assert!(stats.text_chars > 0);

    let html = std::fs::read_to_string(&out).unwrap();
    assert_eq!(embedded_quiz(&html).unwrap().len(), 3);
}

#[tokio::test]
async fn test_generate_from_bytes_uses_extension() {
    let config = QuizConfig::builder()
        .backend(Arc::new(EchoExampleModel { fenced: false }))
        .build()
        .unwrap();
    let bytes = common::pptx_bytes(&[&["Tema"]]);

    let output = generate_from_bytes("tema.pptx", &bytes, &config, &Background::None)
        .await
        .unwrap();
    assert_eq!(output.quiz.len(), 2);
    assert!(output.html.contains("Cuestionario: tema"));
}

// ── Live model ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_gemini_quiz() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 (and GOOGLE_API_KEY) to run live tests");
        return;
    }
    let config = QuizConfig::from_env().expect("GOOGLE_API_KEY must be set for e2e");
    let dir = tempfile::tempdir().unwrap();
    let path = write_pptx(
        dir.path(),
        "fotosintesis.pptx",
        &[
            &["La fotosíntesis", "Proceso por el que las plantas producen glucosa"],
            &["Ocurre en los cloroplastos", "Necesita luz, agua y dióxido de carbono"],
        ],
    );

    let output = generate(&path, &config, &Background::None).await.unwrap();
    assert_eq!(output.quiz.len(), config.question_count);
    println!("{}", serde_json::to_string_pretty(&output.quiz).unwrap());
}
