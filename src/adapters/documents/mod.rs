//! Plain-text extraction from PDF and DOCX documents

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{MovieError, MovieResult};

const DOCX_BODY: &str = "word/document.xml";

fn document_error(path: &Path, message: impl ToString) -> MovieError {
    MovieError::Document {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn ensure_exists(path: &Path) -> MovieResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MovieError::InputNotFound {
            path: path.display().to_string(),
        })
    }
}

/// Text of every page, in page order
pub fn read_pdf(path: &Path) -> MovieResult<String> {
    ensure_exists(path)?;
    let text = pdf_extract::extract_text(path).map_err(|e| document_error(path, e))?;
    debug!("Read {} characters from {}", text.len(), path.display());
    Ok(text)
}

/// Body paragraphs joined by newlines; table contents are left out
pub fn read_docx(path: &Path) -> MovieResult<String> {
    ensure_exists(path)?;
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| document_error(path, e))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| document_error(path, format!("{}: {}", DOCX_BODY, e)))?
        .read_to_string(&mut xml)?;

    let paragraphs = docx_paragraphs(&xml).map_err(|e| document_error(path, e))?;
    debug!("Read {} paragraphs from {}", paragraphs.len(), path.display());
    Ok(paragraphs.join("\n"))
}

/// Text of a PDF or DOCX file, chosen by extension
pub fn read_document(path: &Path) -> MovieResult<String> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("pdf") => read_pdf(path),
        Some("docx") => read_docx(path),
        _ => Err(document_error(path, "expected a .pdf or .docx file")),
    }
}

/// Paragraph texts of a WordprocessingML body
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut table_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), current.as_mut()) {
                (b"w:p", None) if table_depth == 0 => paragraphs.push(String::new()),
                (b"w:tab", Some(text)) => text.push('\t'),
                (b"w:br", Some(text)) => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}
