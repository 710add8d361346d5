//! services/api/src/adapters/pdf.rs
//!
//! The PDF text-extraction collaborator. Text extraction is not available in
//! this service, so the extractor hands back an instructional placeholder that
//! is stored as the document's content, plus an advisory note for the client.

use async_trait::async_trait;
use study_assistant_core::ports::{ExtractedText, PdfTextExtractor, PortError, PortResult};
use tracing::info;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The advisory attached to placeholder content.
pub const EXTRACTION_UNAVAILABLE_NOTE: &str =
    "Text extraction not available - use Paste Text option instead";

/// Accepts any well-formed PDF header and returns the "paste it instead" placeholder.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderPdfExtractor;

impl PlaceholderPdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn placeholder_content(file_name: &str) -> String {
    format!(
        "PDF File: {}\n\n\
         This PDF has been uploaded successfully, but text extraction is not available in the current server environment.\n\n\
         To use this content:\n\
         1. Open the PDF in a PDF reader\n\
         2. Select and copy the text you want to analyze\n\
         3. Use the \"Paste Text\" option in the app\n\
         4. Paste the copied text and click \"Add Text\"\n\n\
         This will allow you to chat with the AI about your PDF content.",
        file_name
    )
}

#[async_trait]
impl PdfTextExtractor for PlaceholderPdfExtractor {
    async fn extract(&self, file_name: &str, data: &[u8]) -> PortResult<ExtractedText> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(PortError::InvalidInput(format!(
                "{} is not a PDF document",
                file_name
            )));
        }

        info!(file_name, size = data.len(), "PDF received; returning placeholder text");
        Ok(ExtractedText {
            content: placeholder_content(file_name),
            pages: 1,
            note: Some(EXTRACTION_UNAVAILABLE_NOTE.to_string()),
        })
    }
}
