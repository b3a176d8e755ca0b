//! Shared fixtures: documents built in code and scripted model backends.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_quiz::prompts::example_structure;
use edgequake_quiz::{ModelError, QuizModel};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

// ── Models ───────────────────────────────────────────────────────────────────

/// Answers with the example structure for the count named in the prompt.
pub struct EchoExampleModel {
    /// Wrap the JSON in a ```json fence, as models often do.
    pub fenced: bool,
}

#[async_trait]
impl QuizModel for EchoExampleModel {
    fn name(&self) -> String {
        "stub/echo".into()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let n = requested_count(prompt);
        let json = serde_json::to_string_pretty(&example_structure(n)).unwrap();
        Ok(if self.fenced {
            format!("```json\n{json}\n```")
        } else {
            json
        })
    }
}

/// Always answers with the same text.
pub struct FixedModel(pub String);

#[async_trait]
impl QuizModel for FixedModel {
    fn name(&self) -> String {
        "stub/fixed".into()
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.0.clone())
    }
}

/// Always fails like an API rejecting the key.
pub struct FailingModel;

#[async_trait]
impl QuizModel for FailingModel {
    fn name(&self) -> String {
        "stub/failing".into()
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Status {
            status: 400,
            body: "API key not valid. Please pass a valid API key.".into(),
        })
    }
}

fn requested_count(prompt: &str) -> usize {
    prompt
        .split("exactamente ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .expect("prompt should state the question count")
}

// ── Documents ────────────────────────────────────────────────────────────────

/// A one-page PDF showing `text` in Courier.
pub fn write_pdf(dir: &Path, name: &str, text: &str) -> PathBuf {
    let mut doc = pdf_document(text);
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Like [`write_pdf`], with a Standard security handler in the trailer.
pub fn write_encrypted_pdf(dir: &Path, name: &str, text: &str) -> PathBuf {
    let mut doc = pdf_document(text);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -44i64,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(vec![1u8; 16]),
            Object::string_literal(vec![1u8; 16]),
        ],
    );
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn pdf_document(text: &str) -> lopdf::Document {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn slide_xml(shapes: &[&str]) -> String {
    let mut body = String::new();
    for (i, text) in shapes.iter().enumerate() {
        body.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {i}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/>"#,
            i + 2
        ));
        if !text.is_empty() {
            body.push_str(r#"<p:txBody><a:bodyPr/><a:lstStyle/>"#);
            for para in text.split('\n') {
                body.push_str(&format!("<a:p><a:r><a:rPr lang=\"es-ES\"/><a:t>{para}</a:t></a:r></a:p>"));
            }
            body.push_str("</p:txBody>");
        }
        body.push_str("</p:sp>");
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{body}<p:pic><p:nvPicPr><p:cNvPr id="99" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr></p:pic></p:spTree></p:cSld></p:sld>"#
    )
}

/// A deck whose slides are given in presentation order. The ZIP stores them
/// in reverse so that entry order and presentation order disagree.
pub fn pptx_bytes(slides: &[&[&str]]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", opts).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
    )
    .unwrap();

    // Slide N in presentation order is stored as slide{count-N+1}.xml.
    let count = slides.len();
    let mut ids = String::new();
    let mut rels = String::new();
    for i in 0..count {
        let file_no = count - i;
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 10 + i));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{file_no}.xml"/>"#,
            10 + i
        ));
    }

    for file_no in 1..=count {
        let slide = slides[count - file_no];
        zip.start_file(format!("ppt/slides/slide{file_no}.xml"), opts).unwrap();
        zip.write_all(slide_xml(slide).as_bytes()).unwrap();
    }

    zip.start_file("ppt/presentation.xml", opts).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", opts).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.finish().unwrap().into_inner()
}

pub fn write_pptx(dir: &Path, name: &str, slides: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pptx_bytes(slides)).unwrap();
    path
}

/// A small PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        2,
        2,
        image::Rgba([255, 255, 255, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}
