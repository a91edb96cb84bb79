//! Text extraction from PDF byte streams.
//!
//! Extraction is an ordered strategy chain: the page-by-page `lopdf`
//! strategy runs first because it preserves page boundaries and tends to
//! decode embedded fonts more faithfully; the whole-document `pdf-extract`
//! baseline runs when the primary yields nothing. The chain stops at the
//! first strategy that produces non-empty text.
//!
//! Empty output is not an error here — it fails open. A scanned form with no
//! text layer extracts cleanly to an empty string, and the orchestrator
//! decides what that means for the run. Only when every strategy raises a
//! parse error does extraction itself fail.

use crate::error::PipelineError;
use tracing::{debug, warn};

/// One way of turning PDF bytes into plain text.
trait ExtractionStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError>;
}

/// Primary: page-by-page extraction via `lopdf`.
///
/// Non-empty page texts are joined with a newline, matching reading order.
/// A zero-page document yields empty text, treated identically to total
/// extraction failure downstream.
struct Pagewise;

impl ExtractionStrategy for Pagewise {
    fn name(&self) -> &'static str {
        "lopdf-pagewise"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        let document = lopdf::Document::load_mem(bytes).map_err(|e| PipelineError::PdfParse {
            detail: e.to_string(),
        })?;
        let pages = document.get_pages();
        debug!(pages = pages.len(), "parsed PDF");

        let mut parts = Vec::new();
        for &number in pages.keys() {
            match document.extract_text(&[number]) {
                Ok(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
                Ok(_) => {}
                // A single undecodable page is not fatal; keep going.
                Err(e) => debug!(page = number, error = %e, "page yielded no text"),
            }
        }
        Ok(parts.join("\n"))
    }
}

/// Fallback: whole-document extraction via `pdf-extract`.
struct Baseline;

impl ExtractionStrategy for Baseline {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| PipelineError::PdfParse {
            detail: e.to_string(),
        })
    }
}

/// Extract plain text from a PDF byte stream.
///
/// Tries each strategy in order until one yields non-empty text. Returns:
///
/// * `Ok(text)` — trimmed, non-empty text from the first successful strategy
/// * `Ok("")`   — at least one strategy ran cleanly but found no text
///   (likely image-based source); the caller must check for emptiness
/// * `Err(_)`   — every strategy failed to parse the document
///
/// Read-only; the input bytes are never modified.
pub fn extract_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let strategies: [&dyn ExtractionStrategy; 2] = [&Pagewise, &Baseline];
    let mut last_error = None;
    let mut any_succeeded = false;

    for strategy in strategies {
        match strategy.extract(bytes) {
            Ok(text) => {
                any_succeeded = true;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    debug!(strategy = strategy.name(), "strategy found no text");
                } else {
                    debug!(
                        strategy = strategy.name(),
                        chars = trimmed.chars().count(),
                        "extracted text"
                    );
                    return Ok(trimmed.to_string());
                }
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "extraction strategy failed");
                last_error = Some(e);
            }
        }
    }

    match (any_succeeded, last_error) {
        // Chain exhausted but the document itself was readable: no text layer.
        (true, _) => Ok(String::new()),
        (false, Some(e)) => Err(e),
        (false, None) => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal single-page PDF containing `text`.
    fn pdf_with_text(text: &str) -> Vec<u8> {
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
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save PDF");
        bytes
    }

    #[test]
    fn extracts_text_from_generated_pdf() {
        let bytes = pdf_with_text("Renewal form for license A-123");
        let text = extract_text(&bytes).unwrap();
        assert!(
            text.contains("Renewal form"),
            "extracted text was: {text:?}"
        );
    }

    #[test]
    fn garbage_bytes_fail_with_parse_error() {
        let err = extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PipelineError::PdfParse { .. }), "got: {err}");
    }

    #[test]
    fn empty_input_fails_with_parse_error() {
        let err = extract_text(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::PdfParse { .. }));
    }
}
