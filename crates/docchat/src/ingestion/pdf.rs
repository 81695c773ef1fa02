//! PDF text extraction

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{Error, Result};

/// How far into the file the `%PDF-` header may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Text pulled out of one PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// All pages' text, in page order
    pub text: String,
    /// Number of pages in the file
    pub page_count: u32,
}

/// Capability: turn PDF bytes into text
///
/// Implementations:
/// - `PdfParser`: pdf-extract with a lopdf fallback
pub trait PdfTextExtractor: Send + Sync {
    /// Extract text from all pages in order; `filename` is used for error messages
    fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedText>;
}

/// Local PDF parser built on pdf-extract and lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }

    /// Quick structural check before handing bytes to the parsers
    fn has_pdf_header(data: &[u8]) -> bool {
        let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
        window.windows(5).any(|w| w == b"%PDF-")
    }

    /// Primary extraction; pdf-extract can panic on malformed fonts
    fn extract_primary(data: &[u8]) -> std::result::Result<String, String> {
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("pdf-extract panicked".to_string()),
        }
    }

    /// Fallback extraction page by page with lopdf
    fn extract_fallback(doc: &lopdf::Document) -> String {
        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("lopdf could not read page {}: {}", page_number, e);
                }
            }
        }
        pages.join("\n")
    }
}

impl PdfTextExtractor for PdfParser {
    fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedText> {
        if data.is_empty() {
            return Err(Error::ingestion(filename, "file is empty"));
        }
        if !Self::has_pdf_header(data) {
            return Err(Error::ingestion(filename, "not a PDF file (missing %PDF- header)"));
        }

        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::ingestion(filename, format!("unreadable PDF: {}", e)))?;
        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(Error::ingestion(filename, "PDF has no pages"));
        }

        let text = match Self::extract_primary(data) {
            Ok(text) if !normalize_text(&text).is_empty() => text,
            Ok(_) => {
                tracing::warn!("pdf-extract found no text in {}, trying lopdf", filename);
                Self::extract_fallback(&doc)
            }
            Err(e) => {
                tracing::warn!("pdf-extract failed on {}: {}, trying lopdf", filename, e);
                Self::extract_fallback(&doc)
            }
        };

        let text = normalize_text(&text);
        if text.is_empty() {
            return Err(Error::ingestion(
                filename,
                "no extractable text (the PDF may be scanned or image-only)",
            ));
        }

        Ok(ExtractedText { text, page_count })
    }
}

/// Clean extracted text: drop NULs, fold typographic punctuation, collapse blank lines
pub fn normalize_text(text: &str) -> String {
    let folded = text
        .replace('\0', "")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{2014}', "--")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut out = String::with_capacity(folded.len());
    let mut blank_run = 0usize;
    for line in folded.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = 0;
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a small PDF with one page per entry, Courier text
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 14.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extracts_single_page() {
        let pdf = build_pdf(&["The capital of France is Paris."]);
        let extracted = PdfParser::new().extract("france.pdf", &pdf).unwrap();
        assert_eq!(extracted.page_count, 1);
        assert!(extracted.text.contains("Paris"));
    }

    #[test]
    fn test_pages_in_order() {
        let pdf = build_pdf(&["Alpha page text", "Omega page text"]);
        let extracted = PdfParser::new().extract("two.pdf", &pdf).unwrap();
        assert_eq!(extracted.page_count, 2);
        let alpha = extracted.text.find("Alpha").unwrap();
        let omega = extracted.text.find("Omega").unwrap();
        assert!(alpha < omega);
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = PdfParser::new()
            .extract("notes.pdf", b"just some text, not a pdf")
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_rejects_corrupt_pdf() {
        let err = PdfParser::new()
            .extract("broken.pdf", b"%PDF-1.4\n%garbage without objects or xref")
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_rejects_empty_bytes() {
        assert!(PdfParser::new().extract("empty.pdf", b"").is_err());
    }

    #[test]
    fn test_normalize_text() {
        let raw = "Line\u{2019}s one\0\r\n\n\n\nSecond \u{201C}quoted\u{201D}   \n  \nthird";
        assert_eq!(normalize_text(raw), "Line's one\n\nSecond \"quoted\"\n\nthird");
        assert_eq!(normalize_text(" \n\t\n"), "");
    }
}
