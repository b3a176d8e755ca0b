//! Prompt construction for quiz synthesis.
//!
//! The example structure shown to the model uses the same keys
//! [`crate::quiz::Quiz`] deserialises. The prompt is in Spanish, like the
//! quizzes it asks for.

use crate::quiz::OPTIONS_PER_QUESTION;
use serde_json::{json, Value};

/// Lead-in phrases every justification must start with.
pub const JUSTIFICATION_LEAD_INS: [&str; 2] = [
    "Según el tema desarrollado,",
    "De acuerdo con el tema desarrollado,",
];

const OPTION_LABELS: [&str; OPTIONS_PER_QUESTION] = ["A", "B", "C", "D"];

/// Build the example structure shown to the model.
///
/// Contains `question_count` placeholder questions with four placeholder
/// options each. The correct index cycles `0, 1, 2, 3, 0, …` so the model does
/// not learn to always mark the same position.
pub fn example_structure(question_count: usize) -> Value {
    let questions: Vec<Value> = (0..question_count)
        .map(|i| {
            let lead_in = JUSTIFICATION_LEAD_INS[i % JUSTIFICATION_LEAD_INS.len()];
            json!({
                "pregunta": format!("¿Tu pregunta {} aquí?", i + 1),
                "opciones": OPTION_LABELS
                    .iter()
                    .map(|l| format!("Opción {l}"))
                    .collect::<Vec<_>>(),
                "respuesta_correcta_index": i % OPTIONS_PER_QUESTION,
                "justificacion": format!(
                    "{lead_in} la justificación de por qué la respuesta {} es correcta.",
                    i + 1
                ),
            })
        })
        .collect();
    json!({ "preguntas": questions })
}

/// Build the full prompt: instructions, example structure, then the document
/// text verbatim as context.
pub fn build_quiz_prompt(text: &str, question_count: usize) -> String {
    let example = serde_json::to_string_pretty(&example_structure(question_count))
        .unwrap_or_else(|_| "{}".to_string());
    let [lead_a, lead_b] = JUSTIFICATION_LEAD_INS;

    format!(
        r#"Basándote en el siguiente texto, genera un cuestionario de exactamente {question_count} preguntas de opción múltiple.
Cada pregunta debe tener exactamente {OPTIONS_PER_QUESTION} opciones y una sola respuesta correcta.
El formato de salida debe ser un objeto JSON válido y nada más. No incluyas '```json' o '```' en la salida.
La justificación de cada respuesta debe comenzar con "{lead_a}" o con "{lead_b}".
"respuesta_correcta_index" es la posición (empezando en 0) de la opción correcta dentro de "opciones".
La estructura debe ser la siguiente:
{example}

Texto de contexto:
{text}"#
    )
}
