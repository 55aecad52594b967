//! Document text extraction for uploaded files.
//!
//! Uses pdf-extract for PDF and reads `word/document.xml` out of the DOCX
//! archive with zip + quick-xml.

use crate::document::{DocumentContext, DocumentFormat};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

/// Path of the main body part inside a DOCX package
const DOCX_BODY: &str = "word/document.xml";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0} (only PDF and DOCX are accepted)")]
    Unsupported(String),
    #[error("file too large: {size} bytes (maximum is {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("error parsing PDF: {0}")]
    PdfError(String),
    #[error("error parsing DOCX archive: {0}")]
    ZipError(#[from] zip::result::ZipError),
    #[error("error parsing DOCX body: {0}")]
    XmlError(#[from] quick_xml::Error),
    #[error("no text found in document")]
    NoContent,
}

/// Check the file name and size of an upload before reading it
pub fn validate_file(filename: &str, size: u64, max_bytes: u64) -> Result<DocumentFormat, ExtractError> {
    let format = DocumentFormat::from_filename(filename)
        .ok_or_else(|| ExtractError::Unsupported(filename.to_string()))?;
    if size > max_bytes {
        return Err(ExtractError::TooLarge { size, max: max_bytes });
    }
    Ok(format)
}

/// Validate, read and extract a document from disk
pub fn read_document(path: &Path, max_bytes: u64) -> Result<DocumentContext, ExtractError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = std::fs::metadata(path)?.len();
    validate_file(&filename, size, max_bytes)?;

    let bytes = std::fs::read(path)?;
    extract_text(&bytes, &filename)
}

/// Extract text and metadata from raw file content
pub fn extract_text(content: &[u8], filename: &str) -> Result<DocumentContext, ExtractError> {
    let format = DocumentFormat::from_filename(filename)
        .ok_or_else(|| ExtractError::Unsupported(filename.to_string()))?;

    let context = match format {
        DocumentFormat::Pdf => extract_pdf(content)?,
        DocumentFormat::Docx => extract_docx(content)?,
    };

    if context.is_empty() {
        return Err(ExtractError::NoContent);
    }

    tracing::info!(
        %format,
        words = context.word_count,
        units = context.page_or_paragraph_count,
        "extracted document text"
    );
    Ok(context)
}

fn extract_pdf(content: &[u8]) -> Result<DocumentContext, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(content)
        .map_err(|e| ExtractError::PdfError(e.to_string()))?;
    let text = pages.join("\n\n");
    Ok(DocumentContext::new(text.trim(), DocumentFormat::Pdf, pages.len()))
}

fn extract_docx(content: &[u8]) -> Result<DocumentContext, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;

    let paragraphs = docx_paragraphs(&xml)?;
    Ok(DocumentContext::new(
        paragraphs.join("\n"),
        DocumentFormat::Docx,
        paragraphs.len(),
    ))
}

/// Collect the text of every non-empty `<w:p>` in document order
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) if in_text => {
                if let Some(ch) = resolve_entity(&e) {
                    current.push(ch);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Resolve a predefined XML entity or a numeric character reference
fn resolve_entity(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x', hex @ ..] => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok().and_then(char::from_u32)
        }
        [b'#', dec @ ..] => std::str::from_utf8(dec).ok()?.parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_bytes(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(DOCX_BODY, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>TERMS OF SERVICE</w:t></w:r></w:p>
    <w:p></w:p>
    <w:p><w:r><w:t xml:space="preserve">Late payments incur </w:t></w:r><w:r><w:t>a 5% penalty.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Fees &amp; charges apply.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn extracts_docx_paragraphs() {
        let ctx = extract_text(&docx_bytes(BODY), "terms.docx").unwrap();
        assert_eq!(ctx.format, DocumentFormat::Docx);
        assert_eq!(ctx.page_or_paragraph_count, 3);
        assert_eq!(
            ctx.text,
            "TERMS OF SERVICE\nLate payments incur a 5% penalty.\nFees & charges apply."
        );
        assert_eq!(ctx.word_count, 13);
    }

    #[test]
    fn empty_docx_has_no_content() {
        let body = r#"<w:document xmlns:w="x"><w:body><w:p/></w:body></w:document>"#;
        assert!(matches!(
            extract_text(&docx_bytes(body), "empty.docx"),
            Err(ExtractError::NoContent)
        ));
    }

    #[test]
    fn garbage_docx_is_a_zip_error() {
        assert!(matches!(
            extract_text(b"not a zip archive", "broken.docx"),
            Err(ExtractError::ZipError(_))
        ));
    }

    #[test]
    fn validates_extension_and_size() {
        let max = 10 * 1024 * 1024;
        assert_eq!(validate_file("test.pdf", 1024, max).unwrap(), DocumentFormat::Pdf);
        assert_eq!(validate_file("test.docx", 1024, max).unwrap(), DocumentFormat::Docx);
        assert!(matches!(
            validate_file("test.txt", 1024, max),
            Err(ExtractError::Unsupported(_))
        ));
        assert!(matches!(
            validate_file("test.pdf", 20 * 1024 * 1024, max),
            Err(ExtractError::TooLarge { .. })
        ));
    }

    #[test]
    fn read_document_checks_size_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.docx");
        std::fs::write(&path, docx_bytes(BODY)).unwrap();
        assert!(matches!(read_document(&path, 10), Err(ExtractError::TooLarge { .. })));
        assert_eq!(read_document(&path, 1 << 20).unwrap().page_or_paragraph_count, 3);
    }

    #[test]
    fn resolves_character_references() {
        assert_eq!(resolve_entity(b"#x20B9"), Some('₹'));
        assert_eq!(resolve_entity(b"#65"), Some('A'));
        assert_eq!(resolve_entity(b"nbsp"), None);
    }
}
