//! Pipeline stages for document-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the model backend can be swapped without
//! touching extraction or rendering.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ postprocess ──▶ render
//! (upload)  (pdf/pptx)  (model)  (fences+schema)  (HTML + encode)
//! ```
//!
//! 1. [`input`]: sanitise upload names, save uploads, derive output paths
//! 2. [`extract`]: dispatch on extension to [`pdf`] or [`pptx`]; CPU-bound,
//!    so async callers run it in `spawn_blocking`
//! 3. [`llm`]: the single best-effort model call; the only stage with
//!    network I/O
//! 4. [`postprocess`]: strip fence noise, parse JSON, validate the schema
//! 5. [`render`]: standalone HTML page, with an optional background image
//!    from [`encode`]

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod pdf;
pub mod postprocess;
pub mod pptx;
pub mod render;
