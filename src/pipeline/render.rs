//! HTML rendering: quiz → standalone, downloadable page.
//!
//! The page is a single file with inline CSS and JS and, optionally, an inline
//! background image, so it works offline once downloaded. Besides the visible
//! markup it embeds the quiz itself as JSON in a
//! `<script id="quiz-data" type="application/json">` block; the page script
//! grades answers from it and [`embedded_quiz`] reads it back.

use crate::pipeline::encode::Background;
use crate::quiz::Quiz;
use std::fmt::Write as _;
use tracing::debug;

const QUIZ_HTML: &str = include_str!("../../templates/quiz.html");

const DATA_OPEN: &str = r#"<script id="quiz-data" type="application/json">"#;
const DATA_CLOSE: &str = "</script>";

/// Render `quiz` to a complete HTML document.
pub fn render_quiz(quiz: &Quiz, background: &Background, title: &str) -> String {
    let html = fill_template(
        QUIZ_HTML,
        &[
            ("title", escape_html(title)),
            ("background_style", background_style(background)),
            ("questions", questions_markup(quiz)),
            ("quiz_json", embedded_json(quiz)),
        ],
    );
    debug!("Rendered {} questions into {} bytes of HTML", quiz.len(), html.len());
    html
}

/// Read back the quiz embedded in a page produced by [`render_quiz`].
pub fn embedded_quiz(html: &str) -> Option<Quiz> {
    let start = html.find(DATA_OPEN)? + DATA_OPEN.len();
    let len = html[start..].find(DATA_CLOSE)?;
    serde_json::from_str(html[start..start + len].trim()).ok()
}

/// Minimal escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitute `{{ key }}` placeholders in a single pass over the template.
///
/// Substituted values are never rescanned, so document text that happens to
/// contain `{{ ... }}` is left alone. Unknown placeholders are kept verbatim.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = after[..close].trim();
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

fn background_style(background: &Background) -> String {
    match background.data_uri() {
        Some(uri) => format!(
            "background-image: url('{uri}'); background-size: cover; \
             background-position: center; background-attachment: fixed;"
        ),
        None => String::new(),
    }
}

fn questions_markup(quiz: &Quiz) -> String {
    let mut out = String::new();
    for (i, q) in quiz.questions.iter().enumerate() {
        let _ = writeln!(
            out,
            r#"<section class="question" id="q{i}" data-correct="{}">"#,
            q.correct_index
        );
        let _ = writeln!(out, "  <h2>{}. {}</h2>", i + 1, escape_html(&q.prompt));
        out.push_str("  <ul class=\"options\">\n");
        for (j, option) in q.options.iter().enumerate() {
            let _ = writeln!(
                out,
                r#"    <li><label><input type="radio" name="q{i}" value="{j}"> {}</label></li>"#,
                escape_html(option)
            );
        }
        out.push_str("  </ul>\n");
        let _ = writeln!(
            out,
            r#"  <p class="justification" hidden>{}</p>"#,
            escape_html(&q.justification)
        );
        out.push_str("</section>\n");
    }
    out
}

/// Quiz JSON safe to place inside a `<script>` element.
fn embedded_json(quiz: &Quiz) -> String {
    serde_json::to_string(quiz)
        .unwrap_or_else(|_| "{\"preguntas\":[]}".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
