//! Format-specific text extraction and video demux
//!
//! - `txt`: UTF-8 contents
//! - `pdf`: page text in document order (lopdf)
//! - `docx`: paragraph text from `word/document.xml` (zip + regex)
//! - images: `line` blocks from the OCR capability
//! - video: audio track written by the demux capability

use crate::error::PipelineError;
use crate::models::MediaKind;
use crate::types::{AudioDemuxer, TextBlockKind, TextRecognizer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Paragraph open/close/self-closing tags, text runs, tabs and breaks
static DOCX_TOKEN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>|<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:(?:br|cr)/>")
});

pub struct Extractor {
    text_recognizer: Arc<dyn TextRecognizer>,
    audio_demuxer: Arc<dyn AudioDemuxer>,
}

impl Extractor {
    pub fn new(
        text_recognizer: Arc<dyn TextRecognizer>,
        audio_demuxer: Arc<dyn AudioDemuxer>,
    ) -> Self {
        Self {
            text_recognizer,
            audio_demuxer,
        }
    }

    /// Plain text of a document or image, dispatched by extension
    pub async fn extract_text(&self, path: &Path, extension: &str) -> Result<String, PipelineError> {
        let extension = extension.to_ascii_lowercase();
        debug!(path = %path.display(), extension = %extension, "Extracting text");

        match extension.as_str() {
            "txt" => {
                let bytes = read_file(path).await?;
                String::from_utf8(bytes).map_err(|e| {
                    PipelineError::ExtractionFailed(format!("Text file is not valid UTF-8: {}", e))
                })
            }
            "pdf" => {
                let bytes = read_file(path).await?;
                run_blocking(move || extract_pdf_text(&bytes)).await
            }
            "docx" => {
                let bytes = read_file(path).await?;
                run_blocking(move || extract_docx_text(&bytes)).await
            }
            ext if MediaKind::Image.allows(ext) => {
                let bytes = read_file(path).await?;
                self.extract_image_text(&bytes).await
            }
            other => Err(PipelineError::UnsupportedFormat(format!(
                "No text extractor for '.{}'",
                other
            ))),
        }
    }

    async fn extract_image_text(&self, image: &[u8]) -> Result<String, PipelineError> {
        let blocks = self
            .text_recognizer
            .detect(image)
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("OCR failed: {}", e)))?;

        let mut text = String::new();
        for block in blocks.iter().filter(|b| b.kind == TextBlockKind::Line) {
            text.push_str(&block.text);
            text.push('\n');
        }
        Ok(text)
    }

    /// Write the audio track of `video` to `output`
    pub async fn extract_audio(&self, video: &Path, output: &Path) -> Result<(), PipelineError> {
        self.audio_demuxer
            .extract_audio(video, output)
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("Audio extraction failed: {}", e)))
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, PipelineError> {
    tokio::fs::read(path).await.map_err(|e| {
        PipelineError::ExtractionFailed(format!("Read {} failed: {}", path.display(), e))
    })
}

async fn run_blocking<F>(job: F) -> Result<String, PipelineError>
where
    F: FnOnce() -> Result<String, PipelineError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PipelineError::ExtractionFailed(format!("Extraction task failed: {}", e)))?
}

/// Text of every page, in page order, each followed by a newline
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| PipelineError::ExtractionFailed(format!("Unreadable PDF: {}", e)))?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        let page_text = document.extract_text(&[*page_number]).map_err(|e| {
            PipelineError::ExtractionFailed(format!("PDF page {}: {}", page_number, e))
        })?;
        text.push_str(page_text.trim_end_matches('\n'));
        text.push('\n');
    }
    Ok(text)
}

/// Paragraph text of a `.docx` package, joined by newlines
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PipelineError::ExtractionFailed(format!("Unreadable DOCX: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX has no document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX body unreadable: {}", e)))?;

    paragraphs_from_document_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn compiled(re: &'static Lazy<Result<Regex, regex::Error>>) -> Result<&'static Regex, PipelineError> {
    re.as_ref()
        .map_err(|e| PipelineError::ExtractionFailed(format!("Pattern error: {}", e)))
}

/// Paragraph texts of a WordprocessingML body
///
/// Self-closing paragraphs (`<w:p/>`, `<w:p w:rsidR=".."/>`) are empty
/// paragraphs. Text outside any paragraph is ignored.
pub fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>, PipelineError> {
    let token_re = compiled(&DOCX_TOKEN)?;

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;

    for token in token_re.captures_iter(xml) {
        let tag = &token[0];
        if tag.starts_with("<w:p") {
            if let Some(open) = current.take() {
                paragraphs.push(open);
            }
            if tag.ends_with("/>") {
                paragraphs.push(String::new());
            } else {
                current = Some(String::new());
            }
        } else if tag == "</w:p>" {
            if let Some(text) = current.take() {
                paragraphs.push(text);
            }
        } else if let Some(text) = current.as_mut() {
            match token.get(1) {
                Some(t) => text.push_str(&unescape_xml(t.as_str())),
                None if tag.starts_with("<w:tab") => text.push('\t'),
                None => text.push('\n'),
            }
        }
    }

    if let Some(open) = current {
        paragraphs.push(open);
    }
    Ok(paragraphs)
}

fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            write!(
                writer,
                r#"<?xml version="1.0"?><w:document xmlns:w="x"><w:body>{}</w:body></w:document>"#,
                body
            )
            .unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn docx_paragraphs_in_order() {
        let body = r#"<w:p w:rsidR="1"><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p>"#;
        let text = extract_docx_text(&docx_with_body(body)).unwrap();
        assert_eq!(text, "Hello world\n\nFish & chips");
    }

    #[test]
    fn attributed_empty_paragraphs_are_kept() {
        let xml = r#"<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p w:rsidR="1"/><w:p><w:r><w:t>three</w:t></w:r></w:p>"#;
        assert_eq!(paragraphs_from_document_xml(xml).unwrap(), vec!["one", "", "three"]);

        let xml = r#"<w:p w:rsidR="00A1" w:rsidRDefault="00A1"/><w:p><w:r><w:t>two</w:t></w:r></w:p>"#;
        assert_eq!(paragraphs_from_document_xml(xml).unwrap(), vec!["", "two"]);
    }

    #[test]
    fn paragraph_properties_are_not_paragraphs() {
        let xml = r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>"#;
        assert_eq!(paragraphs_from_document_xml(xml).unwrap(), vec!["Title"]);
    }

    fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
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
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn pdf_pages_come_back_in_order() {
        let bytes = pdf_with_pages(&["First page", "Second page", "Third page"]);
        let text = extract_pdf_text(&bytes).unwrap();

        let first = text.find("First page").unwrap();
        let second = text.find("Second page").unwrap();
        let third = text.find("Third page").unwrap();
        assert!(first < second && second < third, "{:?}", text);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn docx_tabs_and_breaks() {
        let body = r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#;
        assert_eq!(extract_docx_text(&docx_with_body(body)).unwrap(), "a\tb\nc");
    }

    #[test]
    fn docx_without_body_fails() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.finish().unwrap();
        }
        let err = extract_docx_text(&buffer.into_inner()).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionFailed(_)));
    }

    #[test]
    fn garbage_is_not_a_pdf_or_docx() {
        assert!(matches!(
            extract_pdf_text(b"not a pdf"),
            Err(PipelineError::ExtractionFailed(_))
        ));
        assert!(matches!(
            extract_docx_text(b"not a zip"),
            Err(PipelineError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn unescape_handles_amp_last() {
        assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
        assert_eq!(unescape_xml("a &lt; b"), "a < b");
    }
}
